use pnp::model::{ContentType, ContentTypeFlags, DataRow, FieldRef, ListInstance};
use pnp::{MemoryStore, Template, XmlFormatter};
use uuid::Uuid;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut template = Template::new("PROJECT-SITE");
    template.version = 2.0;
    template.parameters.insert("Owner".into(), "pm@contoso.com".into());

    let project_id = Uuid::from_u128(0x23203E97_3BFE_40CB_AFB4_07AA2B86BF45);
    template.content_types.push(ContentType {
        id: "0x0100A33D9AD9805788419BDAAC2CCB37509F".into(),
        name: "Project".into(),
        group: "Contoso".into(),
        flags: ContentTypeFlags::OVERWRITE,
        field_refs: vec![FieldRef::new(project_id)],
        ..ContentType::default()
    });
    template.lists.push(ListInstance {
        title: "Projects".into(),
        template_type: 100,
        url: "Lists/Projects".into(),
        on_quick_launch: true,
        data_rows: vec![DataRow::new([("Title", "Apollo")])],
        ..ListInstance::default()
    });

    let formatter = XmlFormatter::new(MemoryStore::new());
    let bytes = formatter.to_formatted_template(&template)?;
    println!("{}", String::from_utf8_lossy(&bytes));
    println!("valid: {}", formatter.is_valid(&bytes));
    Ok(())
}
