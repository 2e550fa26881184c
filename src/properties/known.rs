use std::fmt;
use std::str::FromStr;

use super::PropertyError;

/// The allow-list of properties init reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Property {
    ComponentManagerDisableUpdateCheck,
    ComputeRegion,
    ComputeZone,
    CoreAccount,
    CoreDisablePrompts,
    CoreDisableUsageReporting,
    CoreInteractiveUxStyle,
    CoreLogHttp,
    CoreProject,
}

impl Property {
    pub const ALL: [Property; 9] = [
        Property::ComponentManagerDisableUpdateCheck,
        Property::ComputeRegion,
        Property::ComputeZone,
        Property::CoreAccount,
        Property::CoreDisablePrompts,
        Property::CoreDisableUsageReporting,
        Property::CoreInteractiveUxStyle,
        Property::CoreLogHttp,
        Property::CoreProject,
    ];

    pub fn section(self) -> &'static str {
        match self {
            Property::ComponentManagerDisableUpdateCheck => "component_manager",
            Property::ComputeRegion | Property::ComputeZone => "compute",
            Property::CoreAccount
            | Property::CoreDisablePrompts
            | Property::CoreDisableUsageReporting
            | Property::CoreInteractiveUxStyle
            | Property::CoreLogHttp
            | Property::CoreProject => "core",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Property::ComponentManagerDisableUpdateCheck => "disable_update_check",
            Property::ComputeRegion => "region",
            Property::ComputeZone => "zone",
            Property::CoreAccount => "account",
            Property::CoreDisablePrompts => "disable_prompts",
            Property::CoreDisableUsageReporting => "disable_usage_reporting",
            Property::CoreInteractiveUxStyle => "interactive_ux_style",
            Property::CoreLogHttp => "log_http",
            Property::CoreProject => "project",
        }
    }

    /// Environment variable overriding this property, e.g. `CLOUDSDK_CORE_ACCOUNT`.
    pub fn env_var(self) -> String {
        format!(
            "CLOUDSDK_{}_{}",
            self.section().to_ascii_uppercase(),
            self.name().to_ascii_uppercase()
        )
    }

    pub fn default_value(self) -> Option<&'static str> {
        match self {
            Property::CoreDisablePrompts | Property::CoreLogHttp => Some("false"),
            _ => None,
        }
    }

    pub fn from_env_var(var: &str) -> Option<Property> {
        Property::ALL.into_iter().find(|p| p.env_var() == var)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.section(), self.name())
    }
}

impl FromStr for Property {
    type Err = PropertyError;

    /// Parse a `section/key` path. A bare key is looked up in `core`.
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let (section, name) = path.split_once('/').unwrap_or(("core", path));
        Property::ALL
            .into_iter()
            .find(|p| p.section() == section && p.name() == name)
            .ok_or_else(|| PropertyError::UnknownProperty(path.to_string()))
    }
}
