//! Command, variable and type identifiers of the TraCI protocol.

// commands
pub const CMD_GETVERSION: u8 = 0x00;
pub const CMD_SIMSTEP: u8 = 0x02;
pub const CMD_CLOSE: u8 = 0x7f;
pub const CMD_GET_LANE_VARIABLE: u8 = 0xa3;
pub const CMD_GET_VEHICLE_VARIABLE: u8 = 0xa4;
pub const CMD_GET_EDGE_VARIABLE: u8 = 0xaa;
pub const CMD_SET_TL_VARIABLE: u8 = 0xc2;

/// Offset between a get command and its response.
pub const RESPONSE_OFFSET: u8 = 0x10;

// status
pub const RTYPE_OK: u8 = 0x00;
pub const RTYPE_NOTIMPLEMENTED: u8 = 0x01;
pub const RTYPE_ERR: u8 = 0xff;

// types
pub const TYPE_INTEGER: u8 = 0x09;
pub const TYPE_DOUBLE: u8 = 0x0b;
pub const TYPE_STRING: u8 = 0x0c;
pub const TYPE_STRINGLIST: u8 = 0x0e;

// variables
pub const ID_LIST: u8 = 0x00;
pub const LAST_STEP_MEAN_SPEED: u8 = 0x11;
pub const LAST_STEP_VEHICLE_HALTING_NUMBER: u8 = 0x14;
pub const TL_PHASE_INDEX: u8 = 0x22;
pub const VAR_SPEED: u8 = 0x40;
pub const VAR_MAXSPEED: u8 = 0x41;
pub const VAR_TYPE: u8 = 0x4f;
pub const VAR_ROAD_ID: u8 = 0x50;
pub const VAR_LANE_ID: u8 = 0x51;
pub const VAR_LANEPOSITION: u8 = 0x56;
pub const VAR_CO2EMISSION: u8 = 0x60;
pub const VAR_NOISEEMISSION: u8 = 0x66;
pub const VAR_ACCUMULATED_WAITING_TIME: u8 = 0x87;
