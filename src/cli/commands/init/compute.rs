//! Default compute zone and region
//!
//! Defaults come from the project's metadata when it pins them, otherwise
//! from an interactive pick over the zones and regions the project can use.
//! A chosen zone implies its parent region.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::errors::InitError;
use super::messages;
use crate::console::Console;
use crate::external::{args, SelfInvoker};
use crate::properties::{Property, PropertyStore};

const DEFAULT_ZONE_KEY: &str = "google-compute-default-zone";
const DEFAULT_REGION_KEY: &str = "google-compute-default-region";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocationKind {
    Zone,
    Region,
}

impl LocationKind {
    fn as_str(self) -> &'static str {
        match self {
            LocationKind::Zone => "zone",
            LocationKind::Region => "region",
        }
    }

    fn collection(self) -> &'static str {
        match self {
            LocationKind::Zone => "zones",
            LocationKind::Region => "regions",
        }
    }

    fn property(self) -> Property {
        match self {
            LocationKind::Zone => Property::ComputeZone,
            LocationKind::Region => Property::ComputeRegion,
        }
    }
}

/// Zone and region written by a run of the picker.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ComputeDefaults {
    pub zone: Option<String>,
    pub region: Option<String>,
}

/// Defaults pinned in `commonInstanceMetadata`.
fn metadata_defaults(project_info: Option<&Value>) -> (Option<String>, Option<String>) {
    let mut zone = None;
    let mut region = None;
    let items = project_info
        .and_then(|info| info.pointer("/commonInstanceMetadata/items"))
        .and_then(Value::as_array);
    for item in items.into_iter().flatten() {
        let key = item.get("key").and_then(Value::as_str);
        let value = item
            .get("value")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        match key {
            Some(DEFAULT_ZONE_KEY) => zone = value,
            Some(DEFAULT_REGION_KEY) => region = value,
            _ => {}
        }
    }
    (zone, region)
}

/// Last path segment of a resource reference such as
/// `https://.../regions/us-central1`.
fn short_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

fn name_of(resource: &Value) -> Option<&str> {
    resource.get("name").and_then(Value::as_str)
}

pub struct ComputePicker<'a> {
    console: &'a mut Console,
    invoker: &'a dyn SelfInvoker,
    properties: &'a PropertyStore,
}

impl<'a> ComputePicker<'a> {
    pub fn new(
        console: &'a mut Console,
        invoker: &'a dyn SelfInvoker,
        properties: &'a PropertyStore,
    ) -> Self {
        Self {
            console,
            invoker,
            properties,
        }
    }

    pub async fn pick(&mut self) -> Result<ComputeDefaults, InitError> {
        let describe = args(["compute", "project-info", "describe", "--quiet"]);
        let project_info = match self.invoker.invoke(&describe).await {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "Compute project info unavailable");
                self.console.status(messages::COMPUTE_UNAVAILABLE)?;
                return Ok(ComputeDefaults::default());
            }
        };

        let (metadata_zone, mut metadata_region) = metadata_defaults(project_info.as_ref());
        debug!(?metadata_zone, ?metadata_region, "Compute metadata defaults");

        if metadata_zone.is_none()
            && metadata_region.is_none()
            && !self
                .console
                .prompt_continue(None, messages::CONFIGURE_COMPUTE, false)?
        {
            return Ok(ComputeDefaults::default());
        }

        // A region pinned without a zone leaves the zone unset.
        let zone = if metadata_zone.is_some() || metadata_region.is_none() {
            self.set_location(LocationKind::Zone, metadata_zone).await?
        } else {
            None
        };
        if metadata_region.is_none() {
            metadata_region = zone
                .as_ref()
                .and_then(|z| z.get("region"))
                .and_then(Value::as_str)
                .map(str::to_string);
        }
        let region_hint = metadata_region.map(|r| short_name(&r).to_string());
        let region = self.set_location(LocationKind::Region, region_hint).await?;

        Ok(ComputeDefaults {
            zone: zone.as_ref().and_then(name_of).map(str::to_string),
            region: region.as_ref().and_then(name_of).map(str::to_string),
        })
    }

    /// Resolve one location, by describing the known default or by asking,
    /// and persist its name.
    async fn set_location(
        &mut self,
        kind: LocationKind,
        default: Option<String>,
    ) -> Result<Option<Value>, InitError> {
        let resource = match default {
            Some(name) => {
                let describe = vec![
                    "compute".to_string(),
                    kind.collection().to_string(),
                    "describe".to_string(),
                    name,
                ];
                self.invoker.invoke(&describe).await?
            }
            None => self.choose_location(kind).await?,
        };

        let Some(name) = resource.as_ref().and_then(name_of) else {
            return Ok(None);
        };
        self.properties.set(kind.property(), name)?;
        info!(kind = kind.as_str(), name, "Compute default set");
        self.console
            .status(&messages::location_set(kind.as_str(), name))?;
        Ok(resource)
    }

    async fn choose_location(&mut self, kind: LocationKind) -> Result<Option<Value>, InitError> {
        let list = vec![
            "compute".to_string(),
            kind.collection().to_string(),
            "list".to_string(),
        ];
        let values = match self.invoker.invoke(&list).await {
            Ok(Some(Value::Array(values))) => values,
            Ok(_) => return Ok(None),
            Err(e) => {
                warn!(kind = kind.as_str(), error = %e, "Listing locations failed");
                return Ok(None);
            }
        };
        let values: Vec<Value> = values.into_iter().filter(|v| name_of(v).is_some()).collect();
        if values.is_empty() {
            return Ok(None);
        }

        let mut choices: Vec<String> = values
            .iter()
            .filter_map(name_of)
            .map(str::to_string)
            .collect();
        choices.push(messages::skip_location_choice(kind.as_str()));

        let index = self
            .console
            .prompt_choice(&choices, &messages::pick_location(kind.as_str()))?;
        Ok(index.and_then(|i| values.get(i).cloned()))
    }
}
