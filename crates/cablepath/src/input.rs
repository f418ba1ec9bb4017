use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::routing::types::{
    CableEntry, ContainmentCatalogue, ContainmentUnit, EquipmentCatalogue, EquipmentItem,
};

/// A routing job as exported from the design model: the containment and
/// equipment catalogues plus the cable manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingInput {
    #[serde(default)]
    pub containment: Vec<ContainmentUnit>,
    #[serde(default)]
    pub equipment: Vec<EquipmentItem>,
    #[serde(default)]
    pub cables: Vec<CableEntry>,
}

impl RoutingInput {
    /// Load from a `.json` file, or YAML for any other extension.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        };
        parsed.with_context(|| format!("Invalid routing input in {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Split into the catalogues the engine borrows and the manifest.
    pub fn into_parts(
        self,
        tolerance: f64,
    ) -> Result<(ContainmentCatalogue, EquipmentCatalogue, Vec<CableEntry>)> {
        let containment = ContainmentCatalogue::new(self.containment, tolerance)?;
        let equipment = EquipmentCatalogue::new(self.equipment);
        Ok((containment, equipment, self.cables))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::types::Category;

    const SAMPLE: &str = r#"
containment:
  - id: "1001"
    category: tray
    length: 2.0
    connection_points: [{ x: 0, y: 0 }, { x: 2, y: 0 }]
    route_tag: L1-TR-0001
    cable_labels: [C-01]
  - id: "1002"
    category: fitting
    connection_points: [{ x: 2, y: 0 }, { x: 2, y: 0, z: 1 }]
equipment:
  - id: "E1"
    primary_code: MSB-01
    descriptive_name: Main switchboard
    location: { x: -1, y: 0 }
cables:
  - cable_reference: C-01
    from_identifier: MSB-01
    to_identifier: DB-02
"#;

    #[test]
    fn parses_yaml_document() {
        let input = RoutingInput::from_yaml(SAMPLE).unwrap();
        assert_eq!(input.containment.len(), 2);
        assert_eq!(input.containment[1].category, Category::Fitting);
        assert_eq!(input.containment[1].length, 0.0);
        assert_eq!(input.containment[1].connection_points[1].z, 1.0);
        assert_eq!(input.cables[0].to_identifier, "DB-02");
    }

    #[test]
    fn parses_json_document() {
        let json = r#"{
            "equipment": [{ "id": "E1", "location": { "x": 1, "y": 2, "z": 3 } }],
            "cables": [{ "cable_reference": "C-9" }]
        }"#;
        let input = RoutingInput::from_json(json).unwrap();
        assert!(input.containment.is_empty());
        assert_eq!(input.equipment[0].primary_code, None);
        assert_eq!(input.cables[0].from_identifier, "");
    }

    #[test]
    fn duplicate_unit_ids_are_rejected() {
        let mut input = RoutingInput::from_yaml(SAMPLE).unwrap();
        input.containment[1].id = "1001".to_string();
        let err = input.into_parts(0.01).unwrap_err();
        assert!(err.to_string().contains("duplicate containment id '1001'"));
    }
}
