//! Integration test for profile generation

use oas2tosca_common::{ConvertError, ProfileSink};
use oas2tosca_generator::ProfileGenerator;
use oas2tosca_parser::{Converter, ConverterConfig, Document};
use serde_yaml::Value as Yaml;
use std::fs;
use tempfile::TempDir;

const SWAGGER: &str = r##"{
    "swagger": "2.0",
    "info": {"title": "Kubernetes", "version": "v1.27.0"},
    "paths": {
        "/api/v1/namespaces/{namespace}/pods": {
            "post": {
                "parameters": [
                    {"name": "body", "in": "body", "schema": {"$ref": "#/definitions/io.k8s.api.core.v1.Pod"}}
                ]
            }
        }
    },
    "definitions": {
        "io.k8s.api.core.v1.Pod": {
            "description": "Pod is a collection of containers that can run on a host. This resource is created by clients and scheduled onto hosts.",
            "type": "object",
            "x-kubernetes-group-version-kind": [{"group": "", "kind": "Pod", "version": "v1"}],
            "required": ["spec"],
            "properties": {
                "metadata": {
                    "description": "Standard object's metadata.",
                    "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta"
                },
                "spec": {"$ref": "#/definitions/io.k8s.api.core.v1.PodSpec"},
                "priority": {"type": "integer", "default": 0},
                "hostNetwork": {"type": "boolean", "default": false}
            }
        },
        "io.k8s.api.core.v1.PodSpec": {
            "description": "PodSpec is a description of a pod.\nIt holds containers.",
            "type": "object",
            "properties": {
                "restartPolicy": {
                    "type": "string",
                    "enum": ["Always", "OnFailure", "Never"],
                    "pattern": "^[A-Z][a-z]+$"
                },
                "ports": {
                    "type": "array",
                    "items": {"$ref": "#/definitions/io.k8s.api.core.v1.ContainerPort"},
                    "x-kubernetes-list-map-keys": ["containerPort", "protocol"],
                    "x-kubernetes-list-type": "map"
                },
                "nodeSelector": {"type": "object", "additionalProperties": {"type": "string"}},
                "overhead": {"description": "yes"}
            }
        },
        "io.k8s.api.core.v1.ContainerPort": {
            "type": "object",
            "properties": {"containerPort": {"type": "integer"}, "protocol": {"type": "string"}}
        },
        "io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta": {
            "type": "object",
            "properties": {"name": {"type": "string", "description": "Name must be unique: see docs"}}
        },
        "io.k8s.apimachinery.pkg.util.intstr.IntOrString": {"type": "string", "format": "int-or-string"}
    }
}"##;

fn write_profiles(dir: &TempDir) -> usize {
    let document = Document::from_json(SWAGGER).unwrap();
    let conversion = Converter::new(document, ConverterConfig::default())
        .unwrap()
        .convert()
        .unwrap();
    let mut generator = ProfileGenerator::new(dir.path()).unwrap().with_source("swagger.json");
    conversion.write_to(&mut generator).unwrap()
}

fn read_yaml(dir: &TempDir, profile: &str) -> Yaml {
    let path = dir.path().join(profile).join("profile.yaml");
    let content = fs::read_to_string(&path).unwrap();
    serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("{} is not valid YAML: {}\n{}", path.display(), e, content))
}

#[test]
fn test_generate_kubernetes_profiles() {
    let temp_dir = TempDir::new().unwrap();
    let written = write_profiles(&temp_dir);
    assert_eq!(written, 3);

    let core = temp_dir.path().join("io/k8s/api/core");
    assert!(core.join("TOSCA.meta").exists());
    assert!(core.join("profile.yaml").exists());

    let meta = fs::read_to_string(core.join("TOSCA.meta")).unwrap();
    assert!(meta.contains("Entry-Definitions: profile.yaml"));

    // Profiles without any emitted types are still written
    assert!(temp_dir
        .path()
        .join("io/k8s/apimachinery/pkg/util/intstr/profile.yaml")
        .exists());
}

#[test]
fn test_profile_yaml_content() {
    let temp_dir = TempDir::new().unwrap();
    write_profiles(&temp_dir);

    let core = read_yaml(&temp_dir, "io/k8s/api/core");
    assert_eq!(core["tosca_definitions_version"], "tosca_simple_yaml_1_3");
    assert_eq!(core["namespace"], "io.k8s.api.core");
    assert_eq!(core["metadata"]["title"], "Kubernetes");

    let imports = core["imports"].as_sequence().unwrap();
    assert_eq!(imports.len(), 1);
    assert_eq!(
        imports[0]["file"],
        "../../apimachinery/pkg/apis/meta/profile.yaml"
    );
    assert_eq!(imports[0]["namespace_prefix"], "meta");

    let pod = &core["node_types"]["Pod"];
    assert_eq!(pod["derived_from"], "tosca.nodes.Root");
    assert_eq!(
        pod["description"],
        "Pod is a collection of containers that can run on a host. This resource is created by clients and scheduled onto hosts."
    );
    assert_eq!(pod["metadata"]["x-kubernetes-group-version-kind"]["kind"], "Pod");

    let properties = &pod["properties"];
    assert_eq!(properties["metadata"]["type"], "meta:ObjectMeta");
    assert_eq!(properties["metadata"]["description"], "Standard object's metadata.");
    assert_eq!(properties["metadata"]["required"], false);
    assert_eq!(properties["spec"]["type"], "PodSpec");
    assert_eq!(properties["spec"]["required"], true);
    assert_eq!(properties["priority"]["default"], 0);
    assert_eq!(properties["hostNetwork"]["default"], false);

    let spec = &core["data_types"]["PodSpec"];
    assert_eq!(spec["derived_from"], "tosca.datatypes.Root");
    assert_eq!(spec["description"], "PodSpec is a description of a pod.\nIt holds containers.");

    let restart = &spec["properties"]["restartPolicy"];
    assert_eq!(restart["type"], "string");
    let constraints = restart["constraints"].as_sequence().unwrap();
    assert_eq!(constraints[0]["valid_values"][2], "Never");
    assert_eq!(constraints[1]["pattern"], "^[A-Z][a-z]+$");

    let ports = &spec["properties"]["ports"];
    assert_eq!(ports["type"], "list");
    assert_eq!(ports["entry_schema"]["type"], "ContainerPort");
    assert_eq!(ports["metadata"]["x-kubernetes-list-type"], "map");
    assert_eq!(ports["metadata"]["x-kubernetes-list-map-keys"][1], "protocol");

    assert_eq!(spec["properties"]["nodeSelector"]["type"], "tosca.datatypes.Root");
    assert_eq!(spec["properties"]["overhead"]["type"], "string");
    assert_eq!(spec["properties"]["overhead"]["description"], "yes");

    assert!(core["data_types"]["ContainerPort"].is_mapping());

    let meta = read_yaml(&temp_dir, "io/k8s/apimachinery/pkg/apis/meta");
    assert!(meta.get("imports").is_none());
    assert!(meta.get("node_types").is_none());
    assert_eq!(
        meta["data_types"]["ObjectMeta"]["properties"]["name"]["description"],
        "Name must be unique: see docs"
    );

    let intstr = read_yaml(&temp_dir, "io/k8s/apimachinery/pkg/util/intstr");
    assert!(intstr.get("node_types").is_none());
    assert!(intstr.get("data_types").is_none());
}

#[test]
fn test_render_profile_without_writing() {
    let document = Document::from_json(SWAGGER).unwrap();
    let conversion = Converter::new(document, ConverterConfig::default())
        .unwrap()
        .convert()
        .unwrap();

    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("never-created");
    let generator = ProfileGenerator::new(&output_dir).unwrap();
    let profile = conversion.profile("io.k8s.api.core").unwrap();
    let rendered = generator.render_profile(profile, &conversion.info).unwrap();

    assert!(rendered.starts_with("tosca_definitions_version: tosca_simple_yaml_1_3\n"));
    assert!(rendered.contains("# This profile was generated by oas2tosca"));
    assert!(rendered.contains("    derived_from: tosca.nodes.Root\n"));
    assert!(!output_dir.exists());
}

#[test]
fn test_write_profile_into_existing_directory() {
    let temp_dir = TempDir::new().unwrap();
    write_profiles(&temp_dir);
    // Writing again overwrites the previous output
    assert_eq!(write_profiles(&temp_dir), 3);

    let mut generator = ProfileGenerator::new(temp_dir.path()).unwrap();
    let profile = oas2tosca_common::Profile::new("solo", "", "solo");
    generator
        .write_profile(&profile, &serde_json::json!({"title": "t"}))
        .unwrap();
    let solo = read_yaml(&temp_dir, "solo");
    assert_eq!(solo["namespace"], "solo");
}

#[test]
fn test_namespace_cannot_leave_output_dir() {
    let outside = TempDir::new().unwrap();
    let name = format!("{}/evil.v1.Foo", outside.path().display());
    let document = Document::from_value(serde_json::json!({
        "swagger": "2.0",
        "info": {"title": "t", "version": "1"},
        "paths": {
            "/foos": {"post": {"parameters": [
                {"name": "body", "in": "body", "schema": {"$ref": format!("#/definitions/{}", name.replace('/', "~1"))}}
            ]}}
        },
        "definitions": {name.clone(): {"type": "object"}}
    }))
    .unwrap();
    let conversion = Converter::new(document, ConverterConfig::default())
        .unwrap()
        .convert()
        .unwrap();

    let temp_dir = TempDir::new().unwrap();
    let mut generator = ProfileGenerator::new(temp_dir.path().join("out")).unwrap();
    let result = conversion.write_to(&mut generator);

    assert!(matches!(result, Err(ConvertError::Generation(_))));
    assert!(!outside.path().join("evil").exists());
    assert!(!temp_dir.path().join("out").exists());
}
