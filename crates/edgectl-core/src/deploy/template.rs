//! Deployment manifest templates.
//!
//! A template is a JSON document whose string values may carry
//! `${...}` placeholders. Resolution is pure and deterministic;
//! every failure here happens before any network submission.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::TemplateError;

const MODULE_PREFIX: &str = "MODULES.";
const PLATFORM_TOKEN: &str = "PLATFORM";

/// Parsed manifest template.
#[derive(Debug, Clone)]
pub struct ManifestTemplate {
    root: Value,
}

impl ManifestTemplate {
    /// Read and parse a template file.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let root = serde_json::from_str(&content).map_err(|source| TemplateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Substitute every placeholder for the given platform. Module
    /// references resolve through the image map, platform-qualified
    /// key first (`<name>.<platform>`), bare module name second.
    pub fn resolve(
        &self,
        platform: &str,
        modules: &BTreeMap<String, String>,
    ) -> Result<Value, TemplateError> {
        resolve_value(&self.root, platform, modules)
    }
}

fn resolve_value(
    value: &Value,
    platform: &str,
    modules: &BTreeMap<String, String>,
) -> Result<Value, TemplateError> {
    match value {
        Value::String(s) => Ok(Value::String(resolve_str(s, platform, modules)?)),
        Value::Array(items) => items
            .iter()
            .map(|item| resolve_value(item, platform, modules))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| Ok((key.clone(), resolve_value(item, platform, modules)?)))
            .collect::<Result<serde_json::Map<_, _>, TemplateError>>()
            .map(Value::Object),
        other => Ok(other.clone()),
    }
}

fn resolve_str(
    input: &str,
    platform: &str,
    modules: &BTreeMap<String, String>,
) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // No closing brace: not a placeholder, keep literally.
            output.push_str(rest);
            return Ok(output);
        };
        output.push_str(&rest[..start]);
        let token = &after[..end];
        output.push_str(&resolve_token(token, platform, modules)?);
        rest = &after[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

fn resolve_token(
    token: &str,
    platform: &str,
    modules: &BTreeMap<String, String>,
) -> Result<String, TemplateError> {
    if token == PLATFORM_TOKEN {
        return Ok(platform.to_string());
    }
    if let Some(name) = token.strip_prefix(MODULE_PREFIX) {
        let qualified = format!("{name}.{platform}");
        return modules
            .get(&qualified)
            .or_else(|| modules.get(name))
            .cloned()
            .ok_or_else(|| TemplateError::UnknownModule(name.to_string()));
    }
    Err(TemplateError::UnresolvedPlaceholder(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn modules(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_module_and_platform_placeholders() {
        let template = ManifestTemplate::from_value(json!({
            "modules": {
                "filtermodule": {
                    "image": "${MODULES.filtermodule}",
                    "platform": "${PLATFORM}"
                }
            }
        }));

        let manifest = template
            .resolve(
                "amd64",
                &modules(&[("filtermodule", "registry.example.com/filtermodule:1.0")]),
            )
            .unwrap();

        assert_eq!(
            manifest["modules"]["filtermodule"]["image"],
            json!("registry.example.com/filtermodule:1.0")
        );
        assert_eq!(manifest["modules"]["filtermodule"]["platform"], json!("amd64"));
    }

    #[test]
    fn platform_qualified_image_wins_over_the_bare_name() {
        let template = ManifestTemplate::from_value(json!({
            "image": "${MODULES.filtermodule}"
        }));
        let map = modules(&[
            ("filtermodule", "registry/filter:generic"),
            ("filtermodule.arm32v7", "registry/filter:arm"),
        ]);

        let manifest = template.resolve("arm32v7", &map).unwrap();
        assert_eq!(manifest["image"], json!("registry/filter:arm"));
    }

    #[test]
    fn unknown_module_fails_composition() {
        let template = ManifestTemplate::from_value(json!({
            "image": "${MODULES.ghostmodule}"
        }));

        let err = template.resolve("amd64", &modules(&[])).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownModule(name) if name == "ghostmodule"));
    }

    #[test]
    fn foreign_placeholder_fails_composition() {
        let template = ManifestTemplate::from_value(json!({
            "registry": "${CONTAINER_REGISTRY_USERNAME}"
        }));

        let err = template.resolve("amd64", &modules(&[])).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::UnresolvedPlaceholder(token) if token == "CONTAINER_REGISTRY_USERNAME"
        ));
    }

    #[test]
    fn placeholders_embedded_in_longer_strings_resolve() {
        let template = ManifestTemplate::from_value(json!({
            "note": "deploys ${MODULES.m} to ${PLATFORM} hosts"
        }));

        let manifest = template
            .resolve("amd64", &modules(&[("m", "img:1")]))
            .unwrap();
        assert_eq!(manifest["note"], json!("deploys img:1 to amd64 hosts"));
    }

    #[test]
    fn unterminated_token_is_kept_literally() {
        let template = ManifestTemplate::from_value(json!({ "raw": "${not-a-token" }));
        let manifest = template.resolve("amd64", &modules(&[])).unwrap();
        assert_eq!(manifest["raw"], json!("${not-a-token"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let template = ManifestTemplate::from_value(json!({
            "a": "${MODULES.m}",
            "b": ["${PLATFORM}", { "c": "${MODULES.m}" }]
        }));
        let map = modules(&[("m", "img:1")]);

        let first = template.resolve("amd64", &map).unwrap();
        let second = template.resolve("amd64", &map).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn load_reads_a_template_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "image": "${{MODULES.m}}" }}"#).unwrap();

        let template = ManifestTemplate::load(file.path()).unwrap();
        let manifest = template
            .resolve("amd64", &modules(&[("m", "img:1")]))
            .unwrap();
        assert_eq!(manifest["image"], json!("img:1"));
    }

    #[test]
    fn load_rejects_a_missing_file() {
        let err = ManifestTemplate::load(Path::new("/nonexistent/deployment.json")).unwrap_err();
        assert!(matches!(err, TemplateError::Read { .. }));
    }

    #[test]
    fn load_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = ManifestTemplate::load(file.path()).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
    }
}
