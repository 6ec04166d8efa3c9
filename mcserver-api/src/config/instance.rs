use anyhow::{anyhow, Context, Result};
use mcserver_common::{InstanceSpec, MaintenancePolicy};

pub const DEFAULT_MACHINE_TYPE: &str = "e2-medium";
pub const DEFAULT_BOOT_IMAGE: &str =
    "projects/debian-cloud/global/images/debian-11-bullseye-v20230912";
pub const DEFAULT_DISK_SIZE_GB: u32 = 20;
pub const DEFAULT_NETWORK: &str = "global/networks/default";

/// Bundled first-boot script (installs Java and runs the Minecraft server).
pub const DEFAULT_STARTUP_SCRIPT: &[u8] = include_bytes!("../../assets/startup-script.sh");

/// Deployment-owned creation parameters. Turned into an `InstanceSpec` only
/// when the instance actually has to be created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceTemplate {
    pub machine_type: String,
    pub boot_disk_image: String,
    pub boot_disk_size_gb: u32,
    pub network: String,
    pub startup_payload: Vec<u8>,
    pub preemptible: bool,
    pub auto_restart: bool,
    pub on_host_maintenance: MaintenancePolicy,
}

impl Default for InstanceTemplate {
    fn default() -> Self {
        Self {
            machine_type: DEFAULT_MACHINE_TYPE.to_string(),
            boot_disk_image: DEFAULT_BOOT_IMAGE.to_string(),
            boot_disk_size_gb: DEFAULT_DISK_SIZE_GB,
            network: DEFAULT_NETWORK.to_string(),
            startup_payload: DEFAULT_STARTUP_SCRIPT.to_vec(),
            preemptible: true,
            auto_restart: false,
            on_host_maintenance: MaintenancePolicy::Terminate,
        }
    }
}

impl InstanceTemplate {
    pub(crate) fn from_source<F>(var: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |name: &str, default: bool| -> Result<bool> {
            match var(name) {
                Some(raw) => super::parse_bool(&raw)
                    .ok_or_else(|| anyhow!("{} must be a boolean, got '{}'", name, raw)),
                None => Ok(default),
            }
        };

        let boot_disk_size_gb = match var("INSTANCE_DISK_SIZE_GB") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("INSTANCE_DISK_SIZE_GB is not a number: '{}'", raw))?,
            None => defaults.boot_disk_size_gb,
        };

        let on_host_maintenance = match var("INSTANCE_ON_HOST_MAINTENANCE") {
            Some(raw) => MaintenancePolicy::parse(&raw).ok_or_else(|| {
                anyhow!("INSTANCE_ON_HOST_MAINTENANCE must be TERMINATE or MIGRATE, got '{}'", raw)
            })?,
            None => defaults.on_host_maintenance,
        };

        let startup_payload = match var("STARTUP_SCRIPT_FILE") {
            Some(path) => {
                let payload = std::fs::read(&path)
                    .with_context(|| format!("failed to read STARTUP_SCRIPT_FILE '{}'", path))?;
                // Instance metadata values are strings.
                std::str::from_utf8(&payload).with_context(|| {
                    format!("STARTUP_SCRIPT_FILE '{}' is not valid UTF-8", path)
                })?;
                payload
            }
            None => defaults.startup_payload,
        };

        Ok(Self {
            machine_type: var("INSTANCE_MACHINE_TYPE").unwrap_or(defaults.machine_type),
            boot_disk_image: var("INSTANCE_IMAGE").unwrap_or(defaults.boot_disk_image),
            boot_disk_size_gb,
            network: var("INSTANCE_NETWORK").unwrap_or(defaults.network),
            startup_payload,
            preemptible: flag("INSTANCE_PREEMPTIBLE", defaults.preemptible)?,
            auto_restart: flag("INSTANCE_AUTO_RESTART", defaults.auto_restart)?,
            on_host_maintenance,
        })
    }

    pub fn build(&self, name: &str) -> InstanceSpec {
        InstanceSpec {
            name: name.to_string(),
            machine_type: self.machine_type.clone(),
            boot_disk_image: self.boot_disk_image.clone(),
            boot_disk_size_gb: self.boot_disk_size_gb,
            network: self.network.clone(),
            startup_payload: self.startup_payload.clone(),
            preemptible: self.preemptible,
            auto_restart: self.auto_restart,
            on_host_maintenance: self.on_host_maintenance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn template(pairs: &[(&str, &str)]) -> Result<InstanceTemplate> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        InstanceTemplate::from_source(&|k: &str| map.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_match_bundled_deployment() {
        let t = template(&[]).unwrap();
        assert_eq!(t.machine_type, "e2-medium");
        assert_eq!(t.boot_disk_size_gb, 20);
        assert!(t.preemptible);
        assert!(!t.auto_restart);
        assert_eq!(t.on_host_maintenance, MaintenancePolicy::Terminate);
        assert!(t.startup_payload.starts_with(b"#!/bin/bash"));
    }

    #[test]
    fn test_overrides() {
        let t = template(&[
            ("INSTANCE_MACHINE_TYPE", "e2-standard-4"),
            ("INSTANCE_DISK_SIZE_GB", "50"),
            ("INSTANCE_PREEMPTIBLE", "false"),
            ("INSTANCE_ON_HOST_MAINTENANCE", "migrate"),
        ])
        .unwrap();
        assert_eq!(t.machine_type, "e2-standard-4");
        assert_eq!(t.boot_disk_size_gb, 50);
        assert!(!t.preemptible);
        assert_eq!(t.on_host_maintenance, MaintenancePolicy::Migrate);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(template(&[("INSTANCE_DISK_SIZE_GB", "big")]).is_err());
        assert!(template(&[("INSTANCE_AUTO_RESTART", "sometimes")]).is_err());
        assert!(template(&[("INSTANCE_ON_HOST_MAINTENANCE", "REBOOT")]).is_err());
        assert!(template(&[("STARTUP_SCRIPT_FILE", "/nonexistent/startup.sh")]).is_err());
    }

    #[test]
    fn test_startup_script_file_must_be_utf8() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("mcserver-startup-ok-{}.sh", std::process::id()));
        let bad = dir.join(format!("mcserver-startup-bad-{}.sh", std::process::id()));
        std::fs::write(&good, "#!/bin/bash\necho héllo\n").unwrap();
        std::fs::write(&bad, [b'#', b'!', 0xff, 0xfe, b'\n']).unwrap();

        let t = template(&[("STARTUP_SCRIPT_FILE", good.to_str().unwrap())]).unwrap();
        assert_eq!(t.startup_payload, "#!/bin/bash\necho héllo\n".as_bytes());

        let err = template(&[("STARTUP_SCRIPT_FILE", bad.to_str().unwrap())]).unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));

        let _ = std::fs::remove_file(good);
        let _ = std::fs::remove_file(bad);
    }

    #[test]
    fn test_bundled_startup_script_is_utf8() {
        assert!(std::str::from_utf8(DEFAULT_STARTUP_SCRIPT).is_ok());
    }

    #[test]
    fn test_build_uses_fixed_name() {
        let spec = InstanceTemplate::default().build("minecraft-server");
        assert_eq!(spec.name, "minecraft-server");
        assert_eq!(spec.startup_payload, DEFAULT_STARTUP_SCRIPT);
    }
}
