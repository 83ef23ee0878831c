use super::{first_string_literal, has_annotation, parse_annotation};
use crate::domain::facts::{ClassFact, FactStore, MethodFact};
use crate::domain::node::{EntryPoint, Layer};
use crate::domain::ports::EntryPointClassifier;

const CONTROLLER: &[&str] = &["RestController", "Controller"];
const SERVICE: &[&str] = &["Service"];
const REPOSITORY: &[&str] = &["Repository", "Mapper"];
const COMPONENT: &[&str] = &["Component"];

/// Spring MVC / Spring Boot classifier
///
/// Conventions:
/// - stereotype annotations on the class decide the layer
/// - `@GetMapping`, `@PostMapping`, ... and `@RequestMapping` methods are HTTP entry points,
///   prefixed by a class-level `@RequestMapping`
/// - `@Scheduled` methods are `SCHEDULED` entry points
pub struct SpringClassifier;

impl EntryPointClassifier for SpringClassifier {
    fn classify_layer(&self, _class_name: &str, class: Option<&ClassFact>, _method_name: &str) -> Layer {
        let Some(class) = class else {
            return Layer::unknown();
        };
        let annotations = &class.annotations;
        if has_annotation(annotations, CONTROLLER) {
            Layer::controller()
        } else if has_annotation(annotations, SERVICE) {
            Layer::service()
        } else if has_annotation(annotations, REPOSITORY) {
            Layer::repository()
        } else if has_annotation(annotations, COMPONENT) {
            Layer::new("Component")
        } else {
            Layer::unknown()
        }
    }

    fn extract_entry_points(&self, facts: &FactStore) -> Vec<EntryPoint> {
        let mut entries = Vec::new();
        for class in facts.classes() {
            if class.name.trim().is_empty() {
                continue;
            }
            let prefix = class_route_prefix(class);
            for method in &class.methods {
                if let Some((kind, path)) = method_route(method, &prefix) {
                    entries.push(EntryPoint::new(
                        kind,
                        path,
                        &class.name,
                        &method.name,
                        class.file_path.clone(),
                    ));
                }
            }
        }
        entries
    }

    fn name(&self) -> &str {
        "spring"
    }
}

fn class_route_prefix(class: &ClassFact) -> String {
    class
        .annotations
        .iter()
        .filter_map(|a| parse_annotation(a))
        .find(|a| a.name == "RequestMapping")
        .and_then(|a| first_string_literal(a.args))
        .unwrap_or("")
        .to_string()
}

/// Entry kind and path for a method, if it carries a mapping or schedule annotation.
fn method_route(method: &MethodFact, prefix: &str) -> Option<(String, String)> {
    for raw in &method.annotations {
        let Some(annotation) = parse_annotation(raw) else {
            continue;
        };
        let path = || join_route(prefix, first_string_literal(annotation.args).unwrap_or(""));
        let kind = match annotation.name {
            "GetMapping" => "GET",
            "PostMapping" => "POST",
            "PutMapping" => "PUT",
            "DeleteMapping" => "DELETE",
            "PatchMapping" => "PATCH",
            "RequestMapping" => {
                return Some((request_method(annotation.args), path()));
            }
            "Scheduled" => {
                let trigger = first_string_literal(annotation.args)
                    .unwrap_or(annotation.args)
                    .to_string();
                return Some(("SCHEDULED".to_string(), trigger));
            }
            _ => continue,
        };
        return Some((kind.to_string(), path()));
    }
    None
}

/// `RequestMethod.POST` in the arguments, or `REQUEST` when any method matches.
fn request_method(args: &str) -> String {
    args.split("RequestMethod.")
        .nth(1)
        .map(|rest| {
            rest.chars()
                .take_while(|c| c.is_ascii_alphabetic())
                .collect::<String>()
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "REQUEST".to_string())
}

fn join_route(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim().trim_end_matches('/');
    let path = path.trim().trim_start_matches('/');
    let joined = match (prefix.is_empty(), path.is_empty()) {
        (true, true) => return "/".to_string(),
        (false, true) => prefix.to_string(),
        (true, false) => path.to_string(),
        (false, false) => format!("{}/{}", prefix, path),
    };
    if joined.starts_with('/') {
        joined
    } else {
        format!("/{}", joined)
    }
}
