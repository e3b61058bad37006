//! Storage volume planning
//!
//! Index 0 of every planned list is the root volume. A customizable storage
//! type gets either a free-form size or a priced `sizeId`, never both; a
//! volume that cannot be customized carries the plan's size floor.

use super::continuation;
use crate::catalog::types::{CatalogOption, ServicePlan, SizeOption, StorageType, id_string};
use crate::catalog::{CatalogCache, Category};
use crate::context::SelectionContext;
use crate::error::{ProvisionError, Result};
use crate::resolver::{OptionDescriptor, OptionResolver, Overrides, SelectOption};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Id sent for volumes that do not exist yet
pub const NEW_VOLUME_ID: i64 = -1;

fn new_volume_id() -> i64 {
    NEW_VOLUME_ID
}

/// Existing volume ids may arrive as numbers or numeric strings
fn volume_id<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(NEW_VOLUME_ID),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(NEW_VOLUME_ID),
        _ => NEW_VOLUME_ID,
    })
}

fn lenient_size<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| parse_size(&v)))
}

fn parse_size(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Size in GB from a resolved answer
fn size_value(value: &Value, field: &str) -> Result<u64> {
    parse_size(value).ok_or_else(|| ProvisionError::invalid(field, value))
}

/// Larger of an existing size and the plan's floor
fn with_floor(size: Option<u64>, floor: Option<u64>) -> Option<u64> {
    match (size, floor) {
        (Some(size), Some(floor)) => Some(size.max(floor)),
        (size, floor) => size.or(floor),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    #[serde(default = "new_volume_id", deserialize_with = "volume_id")]
    pub id: i64,
    #[serde(default)]
    pub root_volume: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_size")]
    pub size: Option<u64>,
    #[serde(default)]
    pub size_id: Option<Value>,
    #[serde(default, alias = "type")]
    pub storage_type: Option<Value>,
    #[serde(default)]
    pub datastore_id: Option<Value>,
}

impl Volume {
    pub fn new(root: bool, name: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            id: NEW_VOLUME_ID,
            root_volume: root,
            name: name.into(),
            size,
            size_id: None,
            storage_type: None,
            datastore_id: None,
        }
    }

    /// Existing volume with its size raised to the plan's floor
    fn kept(&self, root: bool, floor: Option<u64>) -> Self {
        Self {
            root_volume: root,
            size: with_floor(self.size, floor),
            size_id: None,
            ..self.clone()
        }
    }

    /// Existing volumes never shrink; priced sizes are left alone
    fn raise_to(&mut self, floor: Option<u64>) {
        if self.size_id.is_none() {
            self.size = with_floor(self.size, floor);
        }
    }
}

/// What to do with an existing data volume during a resize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeAction {
    Modify,
    Keep,
    Delete,
}

impl VolumeAction {
    fn choices() -> Vec<SelectOption> {
        vec![
            SelectOption::new("Modify", Self::Modify.to_string()),
            SelectOption::new("Keep", Self::Keep.to_string()),
            SelectOption::new("Delete", Self::Delete.to_string()),
        ]
    }
}

impl fmt::Display for VolumeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Modify => "modify",
            Self::Keep => "keep",
            Self::Delete => "delete",
        })
    }
}

impl FromStr for VolumeAction {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "modify" => Ok(Self::Modify),
            "keep" => Ok(Self::Keep),
            "delete" => Ok(Self::Delete),
            _ => Err(ProvisionError::invalid("action", s)),
        }
    }
}

fn datastore_choice(option: &CatalogOption, name: String) -> SelectOption {
    let value = option
        .id
        .clone()
        .filter(|id| !id.is_null())
        .unwrap_or_else(|| option.value.clone());
    SelectOption::new(name, value)
}

/// Datastores offered by the plan itself: auto options, then grouped entries
pub fn plan_datastore_options(plan: &ServicePlan) -> Vec<SelectOption> {
    let mut options = Vec::new();
    if plan.supports_auto_datastore {
        options.extend(
            plan.auto_options
                .iter()
                .map(|o| datastore_choice(o, o.name.clone())),
        );
    }
    for (group, entries) in &plan.datastores {
        options.extend(
            entries
                .iter()
                .flatten()
                .map(|o| datastore_choice(o, format!("{}: {}", group, o.name))),
        );
    }
    options
}

/// Plan datastores, falling back to the remote list when the plan flags
/// datastore support without listing any
pub fn datastore_options(
    plan: &ServicePlan,
    cache: &mut CatalogCache<'_>,
    ctx: &SelectionContext,
) -> Result<Vec<SelectOption>> {
    let options = plan_datastore_options(plan);
    if options.is_empty() && plan.has_datastore {
        debug!("Plan {} lists no datastores, fetching them", plan.id);
        return Ok(cache
            .get(&Category::Datastores, ctx, false)?
            .iter()
            .map(|o| o.to_select_option())
            .collect());
    }
    Ok(options)
}

fn storage_choices(types: &[StorageType]) -> Vec<SelectOption> {
    types
        .iter()
        .map(|t| SelectOption::new(t.name.clone(), t.id))
        .collect()
}

fn size_choices(
    sizes: &BTreeMap<String, Vec<Option<SizeOption>>>,
    storage_type: Option<&Value>,
) -> Vec<SelectOption> {
    storage_type
        .and_then(id_string)
        .and_then(|id| sizes.get(&id))
        .map(|list| {
            list.iter()
                .flatten()
                .map(|o| SelectOption::new(o.value.clone(), o.key.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Field context and prompt labels for one list position
struct Slot {
    context: String,
    prefix: String,
    root: bool,
}

impl Slot {
    fn root() -> Self {
        Self {
            context: "rootVolume".to_string(),
            prefix: "Root".to_string(),
            root: true,
        }
    }

    fn data(index: usize) -> Self {
        Self {
            context: format!("dataVolume{}", index),
            prefix: format!("Disk {}", index),
            root: false,
        }
    }

    fn descriptor(&self, field: &str, label: String) -> OptionDescriptor {
        OptionDescriptor::text(field, label).in_context(self.context.clone())
    }
}

/// Default label for a new data volume
pub fn data_volume_label(index: usize) -> String {
    if index == 1 {
        "data".to_string()
    } else {
        format!("data {}", index)
    }
}

/// Resolves the volume list for one service plan
pub struct VolumePlanner<'a> {
    plan: &'a ServicePlan,
    overrides: &'a Overrides,
    datastores: Vec<SelectOption>,
}

impl<'a> VolumePlanner<'a> {
    pub fn new(plan: &'a ServicePlan, overrides: &'a Overrides, datastores: Vec<SelectOption>) -> Self {
        Self {
            plan,
            overrides,
            datastores,
        }
    }

    fn limit_reached(&self, planned: usize) -> bool {
        self.plan.disk_limit().is_some_and(|max| planned >= max)
    }

    fn has_preset(&self, index: usize, with_list: bool) -> bool {
        self.overrides.has(&format!("dataVolume{}", index))
            || (with_list && self.overrides.preset("volumes", index).is_some())
    }

    fn preset_volume(&self, index: usize) -> Result<Option<Volume>> {
        match self.overrides.preset("volumes", index) {
            Some(map) => Ok(Some(serde_json::from_value(Value::Object(map.clone()))?)),
            None => Ok(None),
        }
    }

    fn ask(&self, resolver: &mut OptionResolver<'_>, descriptor: &OptionDescriptor) -> Result<Value> {
        resolver.resolve_required(
            descriptor,
            self.overrides.explicit_for(descriptor),
            &descriptor.select_options,
        )
    }

    fn choose_storage_type(
        &self,
        resolver: &mut OptionResolver<'_>,
        slot: &Slot,
        volume: &mut Volume,
        types: &[StorageType],
    ) -> Result<()> {
        if types.is_empty() {
            return Ok(());
        }
        let descriptor = OptionDescriptor::select("storageType", format!("{} Storage Type", slot.prefix))
            .in_context(slot.context.clone())
            .with_choices(storage_choices(types))
            .required()
            .auto_pick()
            .with_description("Choose a storage type.")
            .with_default(volume.storage_type.clone());
        volume.storage_type = Some(self.ask(resolver, &descriptor)?);
        Ok(())
    }

    /// Label and size prompts for a customizable storage type
    fn customize(
        &self,
        resolver: &mut OptionResolver<'_>,
        slot: &Slot,
        volume: &mut Volume,
        floor: Option<u64>,
    ) -> Result<()> {
        let (customizable, sizes) = if slot.root {
            (self.plan.root_disk_customizable, &self.plan.root_custom_size_options)
        } else {
            (self.plan.customize_volume, &self.plan.custom_size_options)
        };
        let storage_type = volume
            .storage_type
            .as_ref()
            .and_then(|id| self.plan.storage_type(id))
            .filter(|_| customizable);

        let Some(storage_type) = storage_type else {
            volume.size = volume.size.or(floor);
            volume.size_id = None;
            return Ok(());
        };

        if storage_type.custom_label {
            let descriptor = slot
                .descriptor("name", format!("{} Volume Label", slot.prefix))
                .required()
                .with_description("Enter a volume label.")
                .with_default(Some(Value::String(volume.name.clone())));
            let name = self.ask(resolver, &descriptor)?;
            volume.name = id_string(&name).unwrap_or_default();
        }

        if storage_type.custom_size {
            let priced = size_choices(sizes, volume.storage_type.as_ref());
            if priced.is_empty() {
                let descriptor = OptionDescriptor::number("size", format!("{} Volume Size (GB)", slot.prefix))
                    .in_context(slot.context.clone())
                    .required()
                    .with_description("Enter a volume size (GB).")
                    .with_default(volume.size.map(Value::from));
                let size = self.ask(resolver, &descriptor)?;
                volume.size = Some(size_value(&size, &descriptor.path())?);
                volume.size_id = None;
            } else {
                let descriptor = OptionDescriptor::select("sizeId", format!("{} Volume Size", slot.prefix))
                    .in_context(slot.context.clone())
                    .with_choices(priced)
                    .required()
                    .with_description("Choose a volume size.")
                    .with_default(volume.size_id.clone());
                volume.size_id = Some(self.ask(resolver, &descriptor)?);
                volume.size = None;
            }
        } else {
            volume.size = volume.size.or(floor);
            volume.size_id = None;
        }
        Ok(())
    }

    fn choose_datastore(
        &self,
        resolver: &mut OptionResolver<'_>,
        slot: &Slot,
        volume: &mut Volume,
    ) -> Result<()> {
        if self.datastores.is_empty() {
            return Ok(());
        }
        let descriptor = OptionDescriptor::select("datastoreId", format!("{} Datastore", slot.prefix))
            .in_context(slot.context.clone())
            .with_choices(self.datastores.clone())
            .required()
            .with_description("Choose a datastore.")
            .with_default(volume.datastore_id.clone());
        volume.datastore_id = Some(self.ask(resolver, &descriptor)?);
        Ok(())
    }

    fn data_volume(
        &self,
        resolver: &mut OptionResolver<'_>,
        index: usize,
        preset: Option<Volume>,
    ) -> Result<Volume> {
        let floor = self.plan.size_gb();
        let slot = Slot::data(index);
        let mut volume = preset.unwrap_or_else(|| Volume::new(false, data_volume_label(index), floor));
        volume.root_volume = false;
        self.choose_storage_type(resolver, &slot, &mut volume, &self.plan.storage_types)?;
        self.customize(resolver, &slot, &mut volume, floor)?;
        self.choose_datastore(resolver, &slot, &mut volume)?;
        Ok(volume)
    }

    /// Grow `volumes` with new data volumes until declined or full
    fn add_data_volumes(
        &self,
        resolver: &mut OptionResolver<'_>,
        volumes: &mut Vec<Volume>,
        mut index: usize,
        with_list: bool,
    ) -> Result<()> {
        if !self.plan.add_volumes {
            return Ok(());
        }
        let mut more = continuation::next(
            resolver,
            self.has_preset(index, with_list),
            self.limit_reached(volumes.len()),
            "Add data volume?",
        )?;
        while more {
            let preset = if with_list { self.preset_volume(index)? } else { None };
            volumes.push(self.data_volume(resolver, index, preset)?);
            index += 1;
            more = continuation::next(
                resolver,
                self.has_preset(index, with_list),
                self.limit_reached(volumes.len()),
                "Add another data volume?",
            )?;
        }
        Ok(())
    }

    /// Volumes for a new instance
    pub fn plan_new(&self, resolver: &mut OptionResolver<'_>) -> Result<Vec<Volume>> {
        let floor = self.plan.size_gb();
        let slot = Slot::root();
        let mut root = self
            .preset_volume(0)?
            .unwrap_or_else(|| Volume::new(true, "root", floor));
        root.root_volume = true;

        self.choose_storage_type(resolver, &slot, &mut root, &self.plan.root_storage_types)?;
        self.customize(resolver, &slot, &mut root, floor)?;
        self.choose_datastore(resolver, &slot, &mut root)?;

        let mut volumes = vec![root];
        self.add_data_volumes(resolver, &mut volumes, 1, true)?;
        Ok(volumes)
    }

    fn action_for(
        &self,
        resolver: &mut OptionResolver<'_>,
        index: usize,
        current: &Volume,
    ) -> Result<VolumeAction> {
        let descriptor = OptionDescriptor::select("action", format!("Modify/Keep/Delete volume '{}'", current.name))
            .in_context(format!("dataVolume{}", index))
            .with_choices(VolumeAction::choices())
            .required()
            .with_description("Modify, Keep or Delete existing data volume?");
        let explicit = self.overrides.explicit_for(&descriptor);
        if explicit.is_none() && !resolver.is_interactive() {
            return Ok(VolumeAction::Keep);
        }
        let answer = resolver.resolve_required(&descriptor, explicit, &descriptor.select_options)?;
        id_string(&answer).unwrap_or_default().parse()
    }

    /// Edit an instance's current volumes for a new plan
    ///
    /// The root volume keeps its storage type and is never removed.
    pub fn plan_resize(
        &self,
        resolver: &mut OptionResolver<'_>,
        current: &[Volume],
    ) -> Result<Vec<Volume>> {
        let Some(current_root) = current.first() else {
            return Err(ProvisionError::invalid("volumes", "[]"));
        };
        let floor = self.plan.size_gb();

        let mut root = current_root.kept(true, floor);
        if self.plan.root_storage_types.is_empty() {
            root.storage_type = None;
        }
        let root_floor = root.size;
        self.customize(resolver, &Slot::root(), &mut root, root_floor)?;
        root.raise_to(root_floor);
        let mut volumes = vec![root];

        for (index, existing) in current.iter().enumerate().skip(1) {
            match self.action_for(resolver, index, existing)? {
                VolumeAction::Delete => {
                    debug!("Dropping volume {} ({})", existing.id, existing.name);
                }
                VolumeAction::Keep => volumes.push(existing.kept(false, floor)),
                VolumeAction::Modify => {
                    let mut volume = existing.kept(false, floor);
                    let volume_floor = volume.size;
                    self.customize(resolver, &Slot::data(index), &mut volume, volume_floor)?;
                    volume.raise_to(volume_floor);
                    volumes.push(volume);
                }
            }
        }

        self.add_data_volumes(resolver, &mut volumes, current.len(), false)?;
        Ok(volumes)
    }
}
