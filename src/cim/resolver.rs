//! Instance Resolution
//!
//! Finds the service and element instances that method calls are aimed
//! at. Lookups are linear scans over a fresh enumeration; nothing is
//! cached between operations.

use crate::cim::decode::decode_string_form;
use crate::cim::instance::CimInstance;
use crate::domain::ports::WbemClient;
use crate::error::{Error, Result};
use tracing::debug;

/// Resolver bound to one connection and namespace
pub struct InstanceResolver<'a> {
    client: &'a dyn WbemClient,
    namespace: &'a str,
}

impl<'a> InstanceResolver<'a> {
    pub fn new(client: &'a dyn WbemClient, namespace: &'a str) -> Self {
        Self { client, namespace }
    }

    /// Enumerate all instances of a class
    pub async fn enumerate(&self, class_name: &str) -> Result<Vec<CimInstance>> {
        let instances = self
            .client
            .enumerate_instances(self.namespace, class_name)
            .await?;
        debug!("Enumerated {} instance(s) of {}", instances.len(), class_name);
        Ok(instances)
    }

    /// Resolve the only instance of a class
    ///
    /// Zero or several instances fail with every path found listed in the
    /// error, so a misconfigured provider is diagnosable from the message.
    pub async fn resolve_singleton(&self, class_name: &str) -> Result<CimInstance> {
        let mut instances = self.enumerate(class_name).await?;
        if instances.len() != 1 {
            return Err(Error::AmbiguousOrMissingInstance {
                class_name: class_name.to_string(),
                found: instances.iter().map(|i| i.path.to_string()).collect(),
            });
        }
        let instance = instances.remove(0);
        debug!("Resolved {} -> {}", class_name, instance.path);
        Ok(instance)
    }

    /// Resolve the first instance whose property renders equal to `value`
    pub async fn resolve_by_property(
        &self,
        class_name: &str,
        property: &str,
        value: &str,
    ) -> Result<CimInstance> {
        for instance in self.enumerate(class_name).await? {
            if decode_string_form(&instance, property)? == value {
                debug!(
                    "Resolved {} {}={} -> {}",
                    class_name, property, value, instance.path
                );
                return Ok(instance);
            }
        }
        Err(Error::InstanceNotFound {
            class_name: class_name.to_string(),
            property: property.to_string(),
            value: value.to_string(),
        })
    }

    /// String form of one property across every instance of a class
    pub async fn property_values(&self, class_name: &str, property: &str) -> Result<Vec<String>> {
        self.enumerate(class_name)
            .await?
            .iter()
            .map(|instance| decode_string_form(instance, property))
            .collect()
    }
}
