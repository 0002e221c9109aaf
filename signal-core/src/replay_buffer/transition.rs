/// A transition `(state, action, reward, next_state)`.
///
/// `reward` is the change of the weighted cumulative waiting time observed while
/// `action` was executing, i.e., previous total minus current total.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// State in which the action was chosen.
    pub state: Vec<f32>,

    /// Index of the green approach.
    pub action: usize,

    /// Reward observed at the next decision point.
    pub reward: f32,

    /// State at the next decision point.
    pub next_state: Vec<f32>,
}

impl Transition {
    /// Constructs a transition.
    pub fn new(state: Vec<f32>, action: usize, reward: f32, next_state: Vec<f32>) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
        }
    }
}
