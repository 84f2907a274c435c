//! The processor registry.
//!
//! Built once at startup from an ordered list of processors and immutable
//! afterwards. Construction is all-or-nothing: the first problem found
//! aborts it with [`TaskError::InvalidConfig`].

use crate::error::{TaskError, TaskResult};
use crate::processor::{declared_schema, PayloadCheck, Processor};
use daedalus_core::ModelValidator;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maps job type names to processors.
#[derive(Clone)]
pub struct ProcessorRegistry {
    processors: HashMap<String, Arc<dyn Processor>>,
    names: Vec<String>,
    validator: Option<Arc<dyn ModelValidator>>,
}

impl ProcessorRegistry {
    /// Registers every processor.
    ///
    /// # Errors
    ///
    /// See [`ProcessorRegistry::from_slots`].
    pub fn new(
        processors: Vec<Arc<dyn Processor>>,
        validator: Option<Arc<dyn ModelValidator>>,
    ) -> TaskResult<Self> {
        Self::from_slots(processors.into_iter().map(Some).collect(), validator)
    }

    /// Registers processors from a list that may contain empty slots.
    ///
    /// Each slot is checked in order for: presence, a non-blank type name,
    /// uniqueness, then the data and metadata schema rules.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidConfig`] naming the first offending slot
    /// or processor.
    pub fn from_slots(
        slots: Vec<Option<Arc<dyn Processor>>>,
        validator: Option<Arc<dyn ModelValidator>>,
    ) -> TaskResult<Self> {
        let mut processors: HashMap<String, Arc<dyn Processor>> = HashMap::new();
        let mut names = Vec::with_capacity(slots.len());

        for (index, slot) in slots.into_iter().enumerate() {
            let processor = slot.ok_or_else(|| {
                TaskError::invalid_config(format!("Null processor provided at index {index}"))
            })?;

            let type_name = processor.type_name().to_string();
            if type_name.trim().is_empty() {
                return Err(TaskError::invalid_config(format!(
                    "Processor at index {index} defines no name"
                )));
            }
            if processors.contains_key(&type_name) {
                return Err(TaskError::invalid_config(format!(
                    "More than one processor defined for type {type_name}"
                )));
            }

            check_schema(
                &type_name,
                "data",
                processor.data_schema(),
                processor.data_validator(),
                validator.as_deref(),
            )?;
            check_schema(
                &type_name,
                "metaData",
                processor.metadata_schema(),
                processor.metadata_validator(),
                validator.as_deref(),
            )?;

            names.push(type_name.clone());
            processors.insert(type_name, processor);
        }

        tracing::debug!(processors = ?names, "processor registry built");

        Ok(Self {
            processors,
            names,
            validator,
        })
    }

    /// Returns the processor for a type.
    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn Processor>> {
        self.processors.get(type_name)
    }

    /// Returns true if a processor handles the type.
    pub fn contains(&self, type_name: &str) -> bool {
        self.processors.contains_key(type_name)
    }

    /// Returns the registered type names in registration order.
    pub fn process_names(&self) -> Vec<String> {
        self.names.clone()
    }

    /// Returns the model validator processors were checked against.
    pub fn validator(&self) -> Option<&Arc<dyn ModelValidator>> {
        self.validator.as_ref()
    }

    /// Returns the number of processors.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no processors are registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("processors", &self.names)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

fn check_schema(
    type_name: &str,
    field: &str,
    schema: Option<&str>,
    check: Option<&PayloadCheck>,
    validator: Option<&dyn ModelValidator>,
) -> TaskResult<()> {
    let Some(schema) = declared_schema(schema) else {
        return Ok(());
    };
    let Some(validator) = validator else {
        return Err(TaskError::invalid_config(format!(
            "{type_name} defines a {field} schema but model validator not set"
        )));
    };
    if validator.fetch_model(schema).is_none() {
        return Err(TaskError::invalid_config(format!(
            "{type_name} defines a {field} schema {schema} but model validator does not contain it"
        )));
    }
    if check.is_some() {
        return Err(TaskError::invalid_config(format!(
            "{type_name} defines a {field} schema {schema} and also a validation function"
        )));
    }
    Ok(())
}
