//! Command-line selection of the server transport.

use crate::error::ArgumentError;

pub const USAGE: &str = "\
Usage: camel-lsp [--port=<port>]

Serves the Language Server Protocol over stdio, or over a single TCP
connection on 127.0.0.1 when --port is given.

Options:
  --port=<port>  Listen on 127.0.0.1:<port> and serve the first client
  -h, --help     Print this help";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Tcp(u16),
    Help,
}

impl Transport {
    /// Parse the arguments following the program name.
    pub fn from_args<I, S>(args: I) -> Result<Self, ArgumentError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut transport = Transport::Stdio;
        for arg in args {
            let arg = arg.as_ref();
            if arg == "--help" || arg == "-h" {
                return Ok(Transport::Help);
            }
            // Editors commonly pass --stdio explicitly.
            if arg == "--stdio" {
                continue;
            }
            let Some(port) = arg.strip_prefix("--port=") else {
                return Err(ArgumentError::Unknown(arg.to_string()));
            };
            let port = port
                .parse::<u16>()
                .map_err(|_| ArgumentError::InvalidPort(port.to_string()))?;
            transport = Transport::Tcp(port);
        }
        Ok(transport)
    }
}
