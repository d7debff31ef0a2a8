use std::{
    net::{TcpStream, ToSocketAddrs},
    path::PathBuf,
    process::{Child, Command, Stdio},
    sync::Mutex,
    thread,
    time::{Duration, Instant},
};

use crate::{
    settings::ServiceSettings, ServiceBootstrapper, ServiceHandle,
    SERVICE_PROBE_TIMEOUT_MS, SERVICE_READY_POLL_INTERVAL_MAX_MS,
    SERVICE_READY_POLL_INTERVAL_MIN_MS, SERVICE_STOP_WAIT_MS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub cmd: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl LaunchPlan {
    pub fn debug_command(&self) -> Vec<String> {
        let mut parts = vec![self.cmd.clone()];
        parts.extend(self.args.clone());
        parts
    }
}

pub fn resolve_launch_plan(
    command: Option<&str>,
    cwd: Option<PathBuf>,
) -> Result<Option<LaunchPlan>, String> {
    let Some(raw) = command.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    let mut pieces =
        shlex::split(raw).ok_or_else(|| format!("Invalid service command: {raw}"))?;
    if pieces.is_empty() {
        return Err("Service command is empty.".to_string());
    }

    let cmd = pieces.remove(0);
    Ok(Some(LaunchPlan {
        cmd,
        args: pieces,
        cwd,
    }))
}

pub fn probe_tcp(host: &str, port: u16, timeout_ms: u64) -> bool {
    let timeout = Duration::from_millis(timeout_ms.max(50));
    let addrs = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs.collect::<Vec<_>>(),
        Err(_) => return false,
    };
    addrs
        .iter()
        .any(|address| TcpStream::connect_timeout(address, timeout).is_ok())
}

fn clamp_poll_interval(raw_ms: u64) -> Duration {
    Duration::from_millis(raw_ms.clamp(
        SERVICE_READY_POLL_INTERVAL_MIN_MS,
        SERVICE_READY_POLL_INTERVAL_MAX_MS,
    ))
}

fn stop_child_process(child: &mut Child) {
    #[cfg(target_os = "windows")]
    {
        let _ = Command::new("taskkill")
            .args(["/pid", &child.id().to_string(), "/t", "/f"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null())
            .status();
        let _ = child.wait();
    }

    #[cfg(not(target_os = "windows"))]
    {
        let _ = child.kill();
        let deadline = Instant::now() + Duration::from_millis(SERVICE_STOP_WAIT_MS);
        while Instant::now() < deadline {
            if let Ok(Some(_)) = child.try_wait() {
                return;
            }
            thread::sleep(Duration::from_millis(50));
        }
        let _ = child.wait();
    }
}

#[derive(Debug, Default)]
struct ServiceProcessSlot {
    child: Option<Child>,
    // Set by `shutdown`; no process may be spawned afterwards.
    stopping: bool,
}

/// Starts the configured service command (if any) and waits until its port
/// accepts TCP connections.
pub struct ConfiguredServiceBootstrapper {
    settings: ServiceSettings,
    process: Mutex<ServiceProcessSlot>,
    log: fn(&str),
}

impl ConfiguredServiceBootstrapper {
    pub fn new(settings: ServiceSettings, log: fn(&str)) -> Self {
        Self {
            settings,
            process: Mutex::new(ServiceProcessSlot::default()),
            log,
        }
    }

    fn handle(&self) -> ServiceHandle {
        ServiceHandle::new(
            self.settings.host.clone(),
            self.settings.port,
            self.settings.routes.clone(),
        )
    }

    fn is_reachable(&self) -> bool {
        probe_tcp(
            &self.settings.host,
            self.settings.port,
            SERVICE_PROBE_TIMEOUT_MS,
        )
    }

    fn start_service_process(&self, plan: &LaunchPlan) -> Result<(), String> {
        let mut slot = self
            .process
            .lock()
            .map_err(|_| "Service process lock poisoned.".to_string())?;
        if slot.stopping {
            return Err("Shutdown requested before the service process was started.".to_string());
        }
        if slot.child.is_some() {
            return Ok(());
        }

        let mut command = Command::new(&plan.cmd);
        command
            .args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .env("SERVICE_HOST", &self.settings.host)
            .env("SERVICE_PORT", self.settings.port.to_string());
        if let Some(cwd) = &plan.cwd {
            command.current_dir(cwd);
        }

        let child = command.spawn().map_err(|error| {
            format!(
                "Failed to spawn service process with command {:?}: {}",
                plan.debug_command(),
                error
            )
        })?;
        (self.log)(&format!(
            "spawned service process pid={} command={:?}",
            child.id(),
            plan.debug_command()
        ));
        slot.child = Some(child);
        Ok(())
    }

    fn check_child_alive(&self) -> Result<(), String> {
        let mut slot = self
            .process
            .lock()
            .map_err(|_| "Service process lock poisoned.".to_string())?;
        if slot.stopping {
            return Err("Shutdown requested while waiting for the service.".to_string());
        }
        let Some(child) = slot.child.as_mut() else {
            return Ok(());
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                slot.child = None;
                Err(format!(
                    "Service process exited before becoming reachable: {status}"
                ))
            }
            Ok(None) => Ok(()),
            Err(error) => Err(format!("Failed to poll service process status: {error}")),
        }
    }

    fn wait_for_service(&self) -> Result<(), String> {
        let limit = Duration::from_millis(self.settings.ready_timeout_ms);
        let poll_interval = clamp_poll_interval(self.settings.ready_poll_interval_ms);
        let start_time = Instant::now();

        loop {
            if self.is_reachable() {
                (self.log)(&format!(
                    "service reachable at {}:{} after {}ms",
                    self.settings.host,
                    self.settings.port,
                    start_time.elapsed().as_millis()
                ));
                return Ok(());
            }

            self.check_child_alive()?;

            if start_time.elapsed() >= limit {
                return Err(format!(
                    "Timed out after {}ms waiting for service at {}:{}.",
                    limit.as_millis(),
                    self.settings.host,
                    self.settings.port
                ));
            }

            thread::sleep(poll_interval);
        }
    }
}

impl ServiceBootstrapper for ConfiguredServiceBootstrapper {
    fn bootstrap(&self) -> Result<ServiceHandle, String> {
        if self.is_reachable() {
            (self.log)("service already reachable, skipping launch");
            return Ok(self.handle());
        }

        if let Some(plan) =
            resolve_launch_plan(self.settings.command.as_deref(), self.settings.cwd.clone())?
        {
            self.start_service_process(&plan)?;
        } else {
            (self.log)("no service command configured, waiting for an external service");
        }

        self.wait_for_service()?;
        Ok(self.handle())
    }

    fn shutdown(&self) -> Result<(), String> {
        let mut slot = match self.process.lock() {
            Ok(slot) => slot,
            Err(error) => error.into_inner(),
        };
        slot.stopping = true;
        let mut child = slot.child.take();
        drop(slot);
        if let Some(process) = child.as_mut() {
            (self.log)(&format!("stopping service process pid={}", process.id()));
            stop_child_process(process);
        }
        Ok(())
    }
}
