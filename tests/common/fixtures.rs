//! Class fact generators for integration tests.
#![allow(dead_code)]

use callpath::domain::facts::{ClassFact, FactStore, FieldFact, MethodFact, VariableFact};

pub fn method(name: &str, calls: &[&str]) -> MethodFact {
    MethodFact {
        name: name.to_string(),
        calls: calls.iter().map(|c| c.to_string()).collect(),
        ..Default::default()
    }
}

pub fn annotated_method(name: &str, annotations: &[&str], calls: &[&str]) -> MethodFact {
    MethodFact {
        annotations: annotations.iter().map(|a| a.to_string()).collect(),
        ..method(name, calls)
    }
}

pub fn field(name: &str, declared_type: &str) -> FieldFact {
    FieldFact {
        name: name.to_string(),
        declared_type: declared_type.to_string(),
    }
}

pub fn local(name: &str, declared_type: &str) -> VariableFact {
    VariableFact {
        name: name.to_string(),
        declared_type: declared_type.to_string(),
    }
}

/// Concrete class in `<name>.java`.
pub fn class(name: &str, fields: Vec<FieldFact>, methods: Vec<MethodFact>) -> ClassFact {
    ClassFact {
        name: name.to_string(),
        fields,
        methods,
        file_path: format!("{}.java", name),
        ..Default::default()
    }
}

pub fn interface(name: &str, methods: &[&str]) -> ClassFact {
    ClassFact {
        is_interface: true,
        ..class(name, vec![], methods.iter().map(|m| method(m, &[])).collect())
    }
}

pub fn implementing(mut class: ClassFact, interfaces: &[&str]) -> ClassFact {
    class.interfaces = interfaces.iter().map(|i| i.to_string()).collect();
    class
}

pub fn annotated(mut class: ClassFact, annotations: &[&str]) -> ClassFact {
    class.annotations = annotations.iter().map(|a| a.to_string()).collect();
    class
}

/// Controller → UserService → UserRepository, both behind interfaces.
pub fn user_scenario_classes() -> Vec<ClassFact> {
    vec![
        class(
            "Controller",
            vec![field("userService", "UserService")],
            vec![method("handle", &["userService.getUser"])],
        ),
        interface("UserService", &["getUser"]),
        implementing(
            class(
                "UserServiceImpl",
                vec![field("repo", "UserRepository")],
                vec![method("getUser", &["this.repo.find()"])],
            ),
            &["UserService"],
        ),
        interface("UserRepository", &["find"]),
        implementing(
            class("UserRepositoryImpl", vec![], vec![method("find", &[])]),
            &["UserRepository"],
        ),
    ]
}

pub fn user_scenario() -> FactStore {
    FactStore::new(user_scenario_classes())
}

/// The user scenario with Spring annotations and a `GET /users/{id}` route on the controller.
pub fn spring_user_scenario() -> FactStore {
    let mut classes = user_scenario_classes();
    classes[0] = annotated(
        class(
            "Controller",
            vec![field("userService", "UserService")],
            vec![annotated_method(
                "handle",
                &["@GetMapping(\"/{id}\")"],
                &["userService.getUser(id)"],
            )],
        ),
        &["@RestController", "@RequestMapping(\"/users\")"],
    );
    classes[2] = annotated(classes[2].clone(), &["@Service"]);
    classes[4] = annotated(classes[4].clone(), &["@Repository"]);
    FactStore::new(classes)
}

/// Facts document in the JSON provider's format, one file entry per class.
pub fn facts_json(classes: &[ClassFact]) -> String {
    let files: Vec<serde_json::Value> = classes
        .iter()
        .map(|c| {
            serde_json::json!({
                "path": c.file_path,
                "classes": [c],
            })
        })
        .collect();
    serde_json::json!({ "files": files }).to_string()
}
