use a2a_diagram::config::LayoutConfigFile;
use a2a_diagram::{CompileOptions, compile_with_options};
use wasm_bindgen::prelude::*;

fn build_compile_options(options: LayoutConfigFile) -> CompileOptions {
    let mut compile_options = CompileOptions::default();
    options.apply(&mut compile_options.config.layout);
    compile_options
}

fn compile_to_json(code: &str, options_json: Option<&str>) -> Result<String, String> {
    let options = match options_json {
        Some(raw_options) => serde_json::from_str::<LayoutConfigFile>(raw_options)
            .map_err(|error| error.to_string())?,
        None => LayoutConfigFile::default(),
    };

    let model = compile_with_options(code, build_compile_options(options));
    serde_json::to_string(&model).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn compile_a2a_diagram(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    compile_to_json(code, options_json.as_deref()).map_err(|error| JsValue::from_str(&error))
}

#[cfg(test)]
mod tests {
    use crate::compile_to_json;

    #[test]
    fn compiles_topology_with_groups_and_skills() {
        let code = r#"flowchart TB
    subgraph entrypoints["Entry Points"]
        api["API Gateway"]
    end
    subgraph orchestrators["Orchestrators"]
        planner["Planner"]
    end
    api --> planner
    planner -.- skills_planner["Plan, Delegate"]"#;

        let json = compile_to_json(code, Some(r#"{"nodeWidth": 240}"#))
            .expect("topology should compile");
        let model: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(model["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(model["nodes"][0]["width"], 240.0);
        assert_eq!(model["nodes"][1]["skills"][1], "Delegate");
        assert_eq!(model["edges"][0]["source"], "api");
    }

    #[test]
    fn rejects_malformed_options() {
        assert!(compile_to_json("a --> b", Some("{nodeWidth")).is_err());
    }
}
