//! Hand tracker subprocess.
//!
//! Launches `scripts/hand_tracker.py` as a child process. The child is killed
//! and reaped on [`TrackerProcess::stop`] or on drop, so it never outlives the
//! app.

use std::process::{Child, Command, Stdio};

use crate::config::PerceptionConfig;
use crate::error::PerceptionError;

pub struct TrackerProcess {
    child: Option<Child>,
    script: String,
}

impl TrackerProcess {
    /// Launch the tracker.
    ///
    /// Runs: `<python> <tracker_script> --host <host> --port <port>
    ///        --camera <camera> --width <w> --height <h> --fps <fps>`
    pub fn launch(config: &PerceptionConfig) -> Result<Self, PerceptionError> {
        let script = config.tracker_script.display().to_string();
        let child = Command::new(&config.python)
            .arg(&config.tracker_script)
            .args(["--host", &config.host])
            .args(["--port", &config.port.to_string()])
            .args(["--camera", &config.camera.to_string()])
            .args(["--width", &config.capture_width.to_string()])
            .args(["--height", &config.capture_height.to_string()])
            .args(["--fps", &config.capture_fps.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| PerceptionError::Launch {
                script: script.clone(),
                source,
            })?;

        tracing::info!(
            "Hand tracker started (pid: {}, camera: {}, port: {})",
            child.id(),
            config.camera,
            config.port,
        );
        Ok(Self {
            child: Some(child),
            script,
        })
    }

    /// Whether the child is still running (non-blocking). An exited child is
    /// reaped and forgotten.
    pub fn is_running(&mut self) -> bool {
        match &mut self.child {
            Some(child) => match child.try_wait() {
                Ok(None) => true,
                Ok(Some(status)) => {
                    tracing::warn!("Hand tracker '{}' exited with: {}", self.script, status);
                    self.child = None;
                    false
                }
                Err(e) => {
                    tracing::error!("Failed to check hand tracker status: {}", e);
                    false
                }
            },
            None => false,
        }
    }

    /// Kill and reap the child. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            tracing::info!("Stopping hand tracker (pid: {})", child.id());
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for TrackerProcess {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_interpreter() {
        let config = PerceptionConfig {
            python: "definitely-not-a-python-binary".to_string(),
            tracker_script: PathBuf::from("scripts/hand_tracker.py"),
            ..PerceptionConfig::default()
        };
        match TrackerProcess::launch(&config) {
            Err(PerceptionError::Launch { script, .. }) => {
                assert_eq!(script, "scripts/hand_tracker.py")
            }
            _ => panic!("launch should fail"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_kills_child() {
        // Stand-in child. It may exit early on the tracker flags; stop()
        // must cope either way.
        let config = PerceptionConfig {
            python: "sleep".to_string(),
            tracker_script: PathBuf::from("30"),
            ..PerceptionConfig::default()
        };
        let mut process = match TrackerProcess::launch(&config) {
            Ok(p) => p,
            Err(_) => return,
        };
        process.stop();
        assert!(!process.is_running());
        process.stop();
    }
}
