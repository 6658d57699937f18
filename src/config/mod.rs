//! Configuration loading and management

use crate::core::deadline::DeadlineStrategyConfig;
use crate::core::error::ConfigError;
use crate::core::reminder::ReminderPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// A company: its deadline rule, reminder cadence and tracked members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyConfig {
    pub id: Uuid,

    pub name: String,

    /// Submission deadline strategy, owned 1:1 by the company
    #[serde(default)]
    pub deadline: DeadlineStrategyConfig,

    #[serde(default)]
    pub reminders: ReminderPolicy,

    /// Collaborators whose invoices are tracked every month
    #[serde(default)]
    pub members: Vec<Uuid>,
}

impl CompanyConfig {
    pub fn new(name: impl Into<String>, deadline: DeadlineStrategyConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            deadline,
            reminders: ReminderPolicy::default(),
            members: Vec::new(),
        }
    }

    pub fn with_members(mut self, members: impl IntoIterator<Item = Uuid>) -> Self {
        self.members.extend(members);
        self
    }

    /// Replace the deadline strategy after checking it
    pub fn set_deadline(&mut self, deadline: DeadlineStrategyConfig) -> std::result::Result<(), ConfigError> {
        deadline.rule()?;
        self.deadline = deadline;
        Ok(())
    }

    pub fn is_member(&self, user_id: &Uuid) -> bool {
        self.members.contains(user_id)
    }
}

/// Complete configuration of the tracker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub companies: Vec<CompanyConfig>,
}

impl TrackerConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read tracker config '{}'", path))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("invalid tracker config '{}'", path))?;
        tracing::info!(path, companies = config.companies.len(), "loaded tracker config");
        Ok(config)
    }

    /// Load and validate configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject duplicate companies and unusable deadline strategies
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for company in &self.companies {
            if !seen.insert(company.id) {
                return Err(ConfigError::invalid(
                    "companies",
                    format!("duplicate company id {}", company.id),
                ));
            }
            company.deadline.rule().map_err(|e| match e {
                ConfigError::InvalidConfiguration { field, message } => ConfigError::invalid(
                    format!("{}.deadline.{}", company.name, field),
                    message,
                ),
                other => other,
            })?;
        }
        Ok(())
    }

    pub fn company(&self, id: &Uuid) -> std::result::Result<&CompanyConfig, ConfigError> {
        self.companies
            .iter()
            .find(|c| &c.id == id)
            .ok_or(ConfigError::UnknownCompany { id: *id })
    }

    pub fn company_mut(&mut self, id: &Uuid) -> std::result::Result<&mut CompanyConfig, ConfigError> {
        self.companies
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or(ConfigError::UnknownCompany { id: *id })
    }
}
