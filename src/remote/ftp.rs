//! FTP backend on top of `suppaftp`.

use std::io::Read;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use suppaftp::types::FileType;
use suppaftp::FtpStream;

use super::RemoteStore;
use crate::error::SyncError;
use crate::settings::FtpTarget;

/// An authenticated FTP session in binary transfer mode
pub struct FtpStore {
    stream: FtpStream,
}

impl FtpStore {
    /// Connect, log in and switch to binary transfers
    pub fn connect(target: &FtpTarget, password: &str, timeout: Duration) -> Result<Self, SyncError> {
        let endpoint = format!("{}:{}", target.host, target.port);
        let unreachable = |reason: String| {
            SyncError::Configuration(format!("Could not connect to {endpoint}: {reason}"))
        };

        let addr: SocketAddr = endpoint
            .to_socket_addrs()
            .map_err(|e| unreachable(e.to_string()))?
            .next()
            .ok_or_else(|| unreachable("host did not resolve".to_string()))?;

        let mut stream =
            FtpStream::connect_timeout(addr, timeout).map_err(|e| unreachable(e.to_string()))?;

        stream.login(target.user.as_str(), password).map_err(|e| {
            SyncError::Configuration(format!(
                "Could not login on {} using user {}: {}",
                endpoint, target.user, e
            ))
        })?;

        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| unreachable(format!("cannot switch to binary mode: {e}")))?;

        log::info!("Connected to {} as {}", endpoint, target.user);

        Ok(FtpStore { stream })
    }
}

impl RemoteStore for FtpStore {
    fn current_dir(&mut self) -> Result<String, SyncError> {
        self.stream
            .pwd()
            .map_err(|e| SyncError::navigation(".", e))
    }

    fn change_dir(&mut self, path: &str) -> Result<(), SyncError> {
        self.stream
            .cwd(path)
            .map_err(|e| SyncError::navigation(path, e))
    }

    fn make_dir(&mut self, path: &str) -> Result<(), SyncError> {
        self.stream
            .mkdir(path)
            .map_err(|e| SyncError::remote_write("creating directory", path, e))
    }

    fn remove_dir(&mut self, path: &str) -> Result<(), SyncError> {
        self.stream
            .rmdir(path)
            .map_err(|e| SyncError::remote_write("deleting directory", path, e))
    }

    fn put_file(&mut self, name: &str, mut reader: &mut dyn Read) -> Result<u64, SyncError> {
        self.stream
            .put_file(name, &mut reader)
            .map_err(|e| SyncError::remote_write("uploading", name, e))
    }

    fn remove_file(&mut self, name: &str) -> Result<(), SyncError> {
        self.stream
            .rm(name)
            .map_err(|e| SyncError::remote_write("deleting file", name, e))
    }
}

impl Drop for FtpStore {
    fn drop(&mut self) {
        if let Err(e) = self.stream.quit() {
            log::debug!("FTP QUIT failed: {}", e);
        }
    }
}
