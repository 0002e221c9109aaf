use super::{constants::*, Reader, TraciError, Value, Writer};
use log::{debug, trace, warn};
use std::{
    io::{Read, Write},
    net::{Ipv4Addr, SocketAddr, TcpStream},
    thread,
    time::Duration,
};

/// A blocking TraCI client.
///
/// Every call sends one command and waits for its response.
pub struct TraciClient<S> {
    stream: S,
}

impl TraciClient<TcpStream> {
    /// Connects to a simulator listening on `port` of the local host.
    ///
    /// The simulator needs some time after launch before it accepts connections,
    /// so the connection is attempted up to `attempts` times, sleeping `wait` in between.
    pub fn connect(port: u16, attempts: usize, wait: Duration) -> Result<Self, TraciError> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        for i in 0..attempts {
            match TcpStream::connect(addr) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    debug!("Connected to TraCI port {}", port);
                    return Ok(Self::new(stream));
                }
                Err(e) => {
                    warn!(
                        "Connection to TraCI port {} failed ({}), attempt {} of {}",
                        port,
                        e,
                        i + 1,
                        attempts
                    );
                    thread::sleep(wait);
                }
            }
        }
        Err(TraciError::Connect { port, attempts })
    }
}

impl<S: Read + Write> TraciClient<S> {
    /// Wraps a connected stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Returns the stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Sends a single command and returns the body of the response, starting at its
    /// status command.
    fn send(&mut self, id: u8, content: &[u8]) -> Result<Vec<u8>, TraciError> {
        let msg = Writer::new().command(id, content).into_message();
        trace!("TraCI send {:02x?}", msg);
        self.stream.write_all(&msg)?;
        self.stream.flush()?;

        let mut len = [0u8; 4];
        self.stream.read_exact(&mut len)?;
        let len = (i32::from_be_bytes(len).max(4) - 4) as usize;
        let mut body = vec![0u8; len];
        self.stream.read_exact(&mut body)?;
        trace!("TraCI recv {:02x?}", body);
        Ok(body)
    }

    /// Sends a command whose response holds nothing but the status.
    fn send_checked(&mut self, id: u8, content: &[u8]) -> Result<(), TraciError> {
        let body = self.send(id, content)?;
        Reader::new(&body).status(id)
    }

    /// API version and identifier of the simulator.
    pub fn version(&mut self) -> Result<(i32, String), TraciError> {
        let body = self.send(CMD_GETVERSION, &[])?;
        let mut rdr = Reader::new(&body);
        rdr.status(CMD_GETVERSION)?;
        let (id, _) = rdr.command_header()?;
        if id != CMD_GETVERSION {
            return Err(TraciError::UnexpectedResponse {
                expected: CMD_GETVERSION,
                got: id,
            });
        }
        Ok((rdr.i32()?, rdr.string()?))
    }

    /// Advances the simulation up to `time` seconds, or by one step if `time` is 0.
    pub fn simulation_step(&mut self, time: f64) -> Result<(), TraciError> {
        let content = Writer::new().f64(time).into_bytes();
        let body = self.send(CMD_SIMSTEP, &content)?;
        let mut rdr = Reader::new(&body);
        rdr.status(CMD_SIMSTEP)?;
        // no subscriptions are made, their count is read and ignored
        if !rdr.is_empty() {
            rdr.i32()?;
        }
        Ok(())
    }

    /// Reads variable `var` of object `id` with the get command `domain`.
    pub fn get(&mut self, domain: u8, var: u8, id: &str) -> Result<Value, TraciError> {
        let content = Writer::new().u8(var).string(id).into_bytes();
        let body = self.send(domain, &content)?;
        let mut rdr = Reader::new(&body);
        rdr.status(domain)?;

        let expected = domain + RESPONSE_OFFSET;
        let (got, _) = rdr.command_header()?;
        if got != expected {
            return Err(TraciError::UnexpectedResponse { expected, got });
        }
        let var_ = rdr.u8()?;
        let id_ = rdr.string()?;
        if var_ != var || id_ != id {
            debug!("Response for {} 0x{:02x} to request for {} 0x{:02x}", id_, var_, id, var);
        }
        rdr.value()
    }

    /// Reads a double variable.
    pub fn get_double(&mut self, domain: u8, var: u8, id: &str) -> Result<f64, TraciError> {
        match self.get(domain, var, id)? {
            Value::Double(v) => Ok(v),
            v => Err(unexpected_type(TYPE_DOUBLE, &v)),
        }
    }

    /// Reads an integer variable.
    pub fn get_int(&mut self, domain: u8, var: u8, id: &str) -> Result<i32, TraciError> {
        match self.get(domain, var, id)? {
            Value::Int(v) => Ok(v),
            v => Err(unexpected_type(TYPE_INTEGER, &v)),
        }
    }

    /// Reads a string variable.
    pub fn get_string(&mut self, domain: u8, var: u8, id: &str) -> Result<String, TraciError> {
        match self.get(domain, var, id)? {
            Value::String(v) => Ok(v),
            v => Err(unexpected_type(TYPE_STRING, &v)),
        }
    }

    /// Reads a string list variable.
    pub fn get_string_list(
        &mut self,
        domain: u8,
        var: u8,
        id: &str,
    ) -> Result<Vec<String>, TraciError> {
        match self.get(domain, var, id)? {
            Value::StringList(v) => Ok(v),
            v => Err(unexpected_type(TYPE_STRINGLIST, &v)),
        }
    }

    /// Sets the phase index of a traffic light.
    pub fn set_phase(&mut self, tls: &str, phase: i32) -> Result<(), TraciError> {
        let content = Writer::new()
            .u8(TL_PHASE_INDEX)
            .string(tls)
            .value(&Value::Int(phase))
            .into_bytes();
        self.send_checked(CMD_SET_TL_VARIABLE, &content)
    }

    /// Asks the simulator to terminate.
    pub fn close(&mut self) -> Result<(), TraciError> {
        self.send_checked(CMD_CLOSE, &[])
    }
}

fn unexpected_type(expected: u8, v: &Value) -> TraciError {
    let got = match v {
        Value::Int(_) => TYPE_INTEGER,
        Value::Double(_) => TYPE_DOUBLE,
        Value::String(_) => TYPE_STRING,
        Value::StringList(_) => TYPE_STRINGLIST,
    };
    TraciError::UnexpectedType { expected, got }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Replays canned responses and records what was sent.
    struct MockStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl MockStream {
        fn new(responses: Vec<Vec<u8>>) -> Self {
            Self {
                input: Cursor::new(responses.concat()),
                output: vec![],
            }
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn ok(command: u8) -> Writer {
        let status = Writer::new().u8(RTYPE_OK).string("").into_bytes();
        Writer::new().command(command, &status)
    }

    fn get_response(domain: u8, var: u8, id: &str, value: Value) -> Vec<u8> {
        let content = Writer::new().u8(var).string(id).value(&value).into_bytes();
        ok(domain)
            .command(domain + RESPONSE_OFFSET, &content)
            .into_message()
    }

    #[test]
    fn test_get_variables() -> anyhow::Result<()> {
        let stream = MockStream::new(vec![
            get_response(
                CMD_GET_VEHICLE_VARIABLE,
                ID_LIST,
                "",
                Value::StringList(vec!["bus_sk1_0".into(), "car_sd2_1".into()]),
            ),
            get_response(
                CMD_GET_VEHICLE_VARIABLE,
                VAR_LANEPOSITION,
                "bus_sk1_0",
                Value::Double(123.5),
            ),
            get_response(
                CMD_GET_EDGE_VARIABLE,
                LAST_STEP_VEHICLE_HALTING_NUMBER,
                "E2",
                Value::Int(4),
            ),
        ]);
        let mut client = TraciClient::new(stream);
        assert_eq!(
            client.get_string_list(CMD_GET_VEHICLE_VARIABLE, ID_LIST, "")?,
            vec!["bus_sk1_0".to_string(), "car_sd2_1".to_string()]
        );
        assert_eq!(
            client.get_double(CMD_GET_VEHICLE_VARIABLE, VAR_LANEPOSITION, "bus_sk1_0")?,
            123.5
        );
        assert!(matches!(
            client.get_double(CMD_GET_EDGE_VARIABLE, LAST_STEP_VEHICLE_HALTING_NUMBER, "E2"),
            Err(TraciError::UnexpectedType { .. })
        ));

        // the first request: length 4 + 2 + 1 + 4
        let sent = client.into_inner().output;
        assert_eq!(&sent[..4], &11i32.to_be_bytes());
        assert_eq!(&sent[5..7], &[CMD_GET_VEHICLE_VARIABLE, ID_LIST]);
        Ok(())
    }

    #[test]
    fn test_version() -> anyhow::Result<()> {
        let content = Writer::new().i32(21).string("SUMO v1_19_0").into_bytes();
        let response = ok(CMD_GETVERSION)
            .command(CMD_GETVERSION, &content)
            .into_message();
        let mut client = TraciClient::new(MockStream::new(vec![response]));
        assert_eq!(client.version()?, (21, "SUMO v1_19_0".to_string()));

        let sent = client.into_inner().output;
        assert_eq!(sent, vec![0, 0, 0, 6, 2, CMD_GETVERSION]);

        // a reply of another command is rejected
        let response = ok(CMD_GETVERSION)
            .command(CMD_SIMSTEP, &content)
            .into_message();
        let mut client = TraciClient::new(MockStream::new(vec![response]));
        assert!(matches!(
            client.version(),
            Err(TraciError::UnexpectedResponse { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_step_set_phase_and_close() -> anyhow::Result<()> {
        // status followed by the number of subscription results
        let step = ok(CMD_SIMSTEP).i32(0).into_message();

        let stream = MockStream::new(vec![
            step,
            ok(CMD_SET_TL_VARIABLE).into_message(),
            ok(CMD_CLOSE).into_message(),
        ]);
        let mut client = TraciClient::new(stream);
        client.simulation_step(0.0)?;
        client.set_phase("tl_02", 1)?;
        client.close()?;

        let sent = client.into_inner().output;
        // simulation step: 4 + 2 + 8 bytes
        assert_eq!(sent[5], CMD_SIMSTEP);
        // set phase: 4 + 2 + 1 + (4 + 5) + 1 + 4 bytes
        let tl = &sent[14..35];
        assert_eq!(tl[5], CMD_SET_TL_VARIABLE);
        assert_eq!(tl[6], TL_PHASE_INDEX);
        assert_eq!(&tl[16..], &[TYPE_INTEGER, 0, 0, 0, 1][..]);
        assert_eq!(sent[40], CMD_CLOSE);
        Ok(())
    }
}
