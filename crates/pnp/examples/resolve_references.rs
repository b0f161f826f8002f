use pnp::{MemoryStore, XmlFormatter};

const WRAPPER: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<pnp:Provisioning xmlns:pnp="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema">
  <pnp:Preferences Author="ops" />
  <pnp:Templates ID="CONTAINER-SITES">
    <pnp:SharePointProvisioningTemplateFile File="sites/project.xml" ID="PROJECT" />
    <pnp:SharePointProvisioningTemplate ID="TEAM" Version="1" />
  </pnp:Templates>
</pnp:Provisioning>"#;

const PROJECT: &str = r#"<pnp:SharePointProvisioningTemplate xmlns:pnp="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" ID="PROJECT" Version="3">
  <pnp:PropertyBagEntries>
    <pnp:PropertyBagEntry Key="Kind" Value="project" />
  </pnp:PropertyBagEntries>
</pnp:SharePointProvisioningTemplate>"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let store = MemoryStore::new().with_file("sites/project.xml", PROJECT.as_bytes().to_vec());
    let formatter = XmlFormatter::new(store);

    for entry in formatter.list_templates(WRAPPER.as_bytes())? {
        println!(
            "{} / {} {}",
            entry.container.as_deref().unwrap_or("-"),
            entry.id,
            entry.file.as_deref().unwrap_or("(in place)")
        );
    }

    for id in ["TEAM", "PROJECT", "MISSING"] {
        match formatter.to_provisioning_template(WRAPPER.as_bytes(), Some(id)) {
            Ok(template) => println!(
                "{id}: version {}, {} property bag entries",
                template.version,
                template.property_bag_entries.len()
            ),
            Err(err) => println!("{id}: {err}"),
        }
    }
    Ok(())
}
