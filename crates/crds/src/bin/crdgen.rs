//! Prints the `Content` CustomResourceDefinition as YAML.
//!
//! `cargo run -p crds --bin crdgen > deploy/crd.yaml`

use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&crds::Content::crd())?);
    Ok(())
}
