use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::shared::error::{DentalError, Result};

/// One entry of the anomaly label table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyClass {
    pub abbreviation: String,
    pub full_name: String,
    /// RGB overlay color for this class.
    pub color: [u8; 3],
}

impl AnomalyClass {
    pub fn new(abbreviation: &str, full_name: &str, color: [u8; 3]) -> Self {
        Self {
            abbreviation: abbreviation.to_string(),
            full_name: full_name.to_string(),
            color,
        }
    }
}

/// Maps anomaly detector class ids to labels and overlay colors.
///
/// The position of an entry is its class id, so the order must match the
/// anomaly model's output classes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyCatalog {
    classes: Vec<AnomalyClass>,
}

impl AnomalyCatalog {
    /// Builds a catalog, rejecting empty tables, blank labels and duplicate
    /// abbreviations.
    pub fn new(classes: Vec<AnomalyClass>) -> Result<Self> {
        let catalog = Self { classes };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reads a catalog from a JSON file of the form `{"classes": [...]}`.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let catalog: AnomalyCatalog = serde_json::from_str(&json)?;
        catalog.validate()?;
        log::info!(
            "Loaded anomaly catalog with {} classes from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn lookup(&self, class_id: usize) -> Result<&AnomalyClass> {
        self.classes
            .get(class_id)
            .ok_or_else(|| DentalError::UnknownClassId {
                class_id,
                known: self.classes.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[AnomalyClass] {
        &self.classes
    }

    fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(DentalError::Catalog("catalog has no classes".into()));
        }
        let mut seen = HashSet::new();
        for (id, class) in self.classes.iter().enumerate() {
            if class.abbreviation.trim().is_empty() || class.full_name.trim().is_empty() {
                return Err(DentalError::Catalog(format!("class {id} has a blank label")));
            }
            if !seen.insert(class.abbreviation.as_str()) {
                return Err(DentalError::Catalog(format!(
                    "duplicate abbreviation '{}' at class {id}",
                    class.abbreviation
                )));
            }
        }
        Ok(())
    }
}

impl Default for AnomalyCatalog {
    /// The 14-class table of the bundled anomaly detector, in model output order.
    fn default() -> Self {
        Self {
            classes: vec![
                AnomalyClass::new("IMP", "Implant", [230, 25, 75]),
                AnomalyClass::new("PRR", "Prosthetic restoration", [60, 180, 75]),
                AnomalyClass::new("OBT", "Obturation", [255, 225, 25]),
                AnomalyClass::new("END", "Endodontic treatment", [0, 130, 200]),
                AnomalyClass::new("CAR", "Caries", [245, 130, 48]),
                AnomalyClass::new("BON", "Bone loss", [145, 30, 180]),
                AnomalyClass::new("IMT", "Impacted tooth", [70, 240, 240]),
                AnomalyClass::new("API", "Apical periodontitis", [240, 50, 230]),
                AnomalyClass::new("ROT", "Root fragment", [210, 245, 60]),
                AnomalyClass::new("FUR", "Furcation lesion", [250, 190, 212]),
                AnomalyClass::new("APS", "Apical surgery", [0, 128, 128]),
                AnomalyClass::new("ROR", "Root resorption", [220, 190, 255]),
                AnomalyClass::new("ORD", "Orthodontic device", [170, 110, 40]),
                AnomalyClass::new("SRD", "Surgical device", [128, 0, 0]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_has_fourteen_valid_classes() {
        let catalog = AnomalyCatalog::default();
        assert_eq!(catalog.len(), 14);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_default_colors_are_distinct() {
        let catalog = AnomalyCatalog::default();
        let colors: HashSet<[u8; 3]> = catalog.classes().iter().map(|c| c.color).collect();
        assert_eq!(colors.len(), catalog.len());
    }

    #[rstest]
    #[case(0, "IMP", "Implant")]
    #[case(4, "CAR", "Caries")]
    #[case(13, "SRD", "Surgical device")]
    fn test_lookup_known_ids(#[case] id: usize, #[case] abbr: &str, #[case] name: &str) {
        let catalog = AnomalyCatalog::default();
        let class = catalog.lookup(id).unwrap();
        assert_eq!(class.abbreviation, abbr);
        assert_eq!(class.full_name, name);
    }

    #[test]
    fn test_lookup_unknown_id_fails() {
        let catalog = AnomalyCatalog::default();
        let err = catalog.lookup(14).unwrap_err();
        assert!(matches!(
            err,
            DentalError::UnknownClassId {
                class_id: 14,
                known: 14
            }
        ));
    }

    #[test]
    fn test_new_rejects_empty_table() {
        assert!(matches!(
            AnomalyCatalog::new(vec![]),
            Err(DentalError::Catalog(_))
        ));
    }

    #[test]
    fn test_new_rejects_duplicate_abbreviation() {
        let result = AnomalyCatalog::new(vec![
            AnomalyClass::new("CAR", "Caries", [1, 2, 3]),
            AnomalyClass::new("CAR", "Cavity", [4, 5, 6]),
        ]);
        assert!(matches!(result, Err(DentalError::Catalog(_))));
    }

    #[test]
    fn test_new_rejects_blank_name() {
        let result = AnomalyCatalog::new(vec![AnomalyClass::new("CAR", "  ", [1, 2, 3])]);
        assert!(matches!(result, Err(DentalError::Catalog(_))));
    }

    #[test]
    fn test_load_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"classes": [
                {"abbreviation": "FRC", "full_name": "Fracture", "color": [255, 0, 0]},
                {"abbreviation": "CAR", "full_name": "Caries", "color": [0, 255, 0]}
            ]}"#,
        )
        .unwrap();

        let catalog = AnomalyCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup(0).unwrap().full_name, "Fracture");
    }

    #[test]
    fn test_load_rejects_invalid_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{"classes": []}"#).unwrap();
        assert!(matches!(
            AnomalyCatalog::load(&path),
            Err(DentalError::Catalog(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = AnomalyCatalog::load(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, DentalError::Io(_)));
    }
}
