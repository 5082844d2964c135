use crate::config::types::ControlError;
use crate::control::protocol::{ControlRequest, ControlResponse};
use crate::control::SandboxControl;
use crate::logging::LoggingChangeSet;
use log::debug;
use nix::sys::socket::{sendmsg, ControlMessage, MsgFlags};
use std::fs::File;
use std::io::{BufRead, BufReader, IoSlice, Write};
use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

/// Blocking client for a sandbox control socket. Each call opens its own connection.
#[derive(Clone, Debug)]
pub struct UnixControlClient {
    socket_path: PathBuf,
}

impl UnixControlClient {
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<UnixStream, ControlError> {
        UnixStream::connect(&self.socket_path).map_err(|source| ControlError::Connect {
            path: self.socket_path.clone(),
            source,
        })
    }

    /// Send one request, optionally handing `out` to the sandbox, and wait for the reply.
    fn call(
        &self,
        request: &ControlRequest,
        out: Option<&File>,
    ) -> Result<ControlResponse, ControlError> {
        if request.takes_fd() != out.is_some() {
            return Err(ControlError::DescriptorMismatch(request.name()));
        }
        let mut stream = self.connect()?;

        let mut payload = serde_json::to_vec(request)?;
        payload.push(b'\n');
        debug!("Sending {} request to {}", request.name(), self.socket_path.display());

        let written = match out {
            Some(file) => {
                let fds = [file.as_raw_fd()];
                let cmsgs = [ControlMessage::ScmRights(&fds)];
                let iov = [IoSlice::new(&payload)];
                sendmsg::<()>(stream.as_raw_fd(), &iov, &cmsgs, MsgFlags::empty(), None)?
            }
            None => 0,
        };
        stream.write_all(&payload[written..])?;
        stream.flush()?;

        let mut line = String::new();
        BufReader::new(&stream).read_line(&mut line)?;
        if line.trim().is_empty() {
            return Err(ControlError::UnexpectedResponse(request.name()));
        }

        match serde_json::from_str(line.trim_end())? {
            ControlResponse::Error(message) => Err(ControlError::Remote(message)),
            response => Ok(response),
        }
    }

    fn expect_ok(&self, request: ControlRequest, out: Option<&File>) -> Result<(), ControlError> {
        match self.call(&request, out)? {
            ControlResponse::Ok => Ok(()),
            _ => Err(ControlError::UnexpectedResponse(request.name())),
        }
    }
}

impl SandboxControl for UnixControlClient {
    fn stacks(&self) -> Result<String, ControlError> {
        match self.call(&ControlRequest::Stacks, None)? {
            ControlResponse::Stacks(stacks) => Ok(stacks),
            _ => Err(ControlError::UnexpectedResponse(ControlRequest::Stacks.name())),
        }
    }

    fn heap_profile(&self, out: &File) -> Result<(), ControlError> {
        self.expect_ok(ControlRequest::HeapProfile, Some(out))
    }

    fn start_cpu_profile(&self, out: &File) -> Result<(), ControlError> {
        self.expect_ok(ControlRequest::StartCpuProfile, Some(out))
    }

    fn stop_cpu_profile(&self) -> Result<(), ControlError> {
        self.expect_ok(ControlRequest::StopCpuProfile, None)
    }

    fn start_trace(&self, out: &File) -> Result<(), ControlError> {
        self.expect_ok(ControlRequest::StartTrace, Some(out))
    }

    fn stop_trace(&self) -> Result<(), ControlError> {
        self.expect_ok(ControlRequest::StopTrace, None)
    }

    fn change_logging(&self, change: &LoggingChangeSet) -> Result<(), ControlError> {
        self.expect_ok(ControlRequest::ChangeLogging(change.clone()), None)
    }
}
