use crate::cmd::open_project;
use crate::output::{print_json, print_table};
use anyhow::Context;
use stagegate_core::{registry::Registry, store::StateStore};
use std::path::Path;

pub fn run(root: &Path, feature: Option<&str>, json: bool) -> anyhow::Result<()> {
    open_project(root)?;
    let mut store = StateStore::load(root).context("failed to load state")?;
    if let Some(id) = feature {
        Registry::load(root)
            .context("failed to load registry")?
            .require(id)?;
        store.features.retain(|k, _| k == id);
    }

    if json {
        print_json(&store)?;
        return Ok(());
    }
    if store.features.is_empty() {
        println!("No recorded state.");
        return Ok(());
    }

    let rows = store
        .features
        .iter()
        .map(|(id, st)| {
            let scores: Vec<String> = st
                .scores
                .iter()
                .map(|(stage, s)| format!("{stage}={}", s.value))
                .collect();
            vec![
                id.clone(),
                st.stage.map_or_else(|| "-".to_string(), |s| s.to_string()),
                scores.join(" "),
                st.fingerprints.len().to_string(),
                st.test_mappings.len().to_string(),
            ]
        })
        .collect();
    print_table(&["FEATURE", "STAGE", "SCORES", "FINGERPRINTS", "TESTS"], rows);
    Ok(())
}
