//! Blocking TCP client
//!
//! Speaks the same protocol as the server, one request at a time.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::Result;
use crate::protocol::{read_reply, write_request, Reply};

/// A client connection to an EmberKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one request and wait for its reply
    ///
    /// Error replies are returned as `Reply::Error`, not as `Err`.
    pub fn command<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<Reply> {
        write_request(&mut self.writer, tokens)?;
        read_reply(&mut self.reader)
    }

    pub fn ping(&mut self) -> Result<Reply> {
        self.command(&["PING"])
    }

    pub fn get(&mut self, key: &str) -> Result<Reply> {
        self.command(&["GET", key])
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<Reply> {
        self.command(&["SET", key, value])
    }
}
