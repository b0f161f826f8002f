//! Templates shared by the reader and writer tests.

use pnp_model::*;
use uuid::Uuid;

pub const BRANDING_HANDLER: &str = "Contoso.Provisioning.BrandingHandler";
pub const BRANDING_ASSEMBLY: &str = "Contoso.Provisioning";

/// A template with every section populated. Tri-state flags are set so the
/// template survives a write/read cycle unchanged.
pub fn full_template() -> Template {
    let mut template = Template::new("CONTOSO-TEAM");
    template.version = 1.5;
    template.site_policy = Some("Retain 3 years".into());
    template
        .parameters
        .insert("Owner".into(), "team@contoso.com".into());
    template.parameters.insert("Blank".into(), String::new());

    template.property_bag_entries = vec![PropertyBagEntry {
        key: "ProjectCode".into(),
        value: "X-42".into(),
    }];
    template.security = Security {
        additional_administrators: vec![User::new("admin@contoso.com")],
        additional_owners: vec![User::new("owner@contoso.com")],
        additional_members: vec![User::new("dev1@contoso.com"), User::new("dev2@contoso.com")],
        additional_visitors: Vec::new(),
    };
    template.site_fields = vec![Field::new(
        r#"<Field ID="{23203E97-3BFE-40CB-AFB4-07AA2B86BF45}" Type="Text" Name="ProjectID" DisplayName="Project ID" Group="Contoso" />"#,
    )];

    let project_field = Uuid::from_u128(0x23203E97_3BFE_40CB_AFB4_07AA2B86BF45);
    template.content_types = vec![ContentType {
        id: "0x0101009D1CB255DA76424F860D91F20E6C4118".into(),
        name: "Project Document".into(),
        description: "Documents of a project".into(),
        group: "Contoso".into(),
        flags: ContentTypeFlags::OVERWRITE | ContentTypeFlags::HIDDEN,
        document_template: Some("ProjectTemplate.dotx".into()),
        field_refs: vec![FieldRef {
            id: project_field,
            hidden: false,
            required: true,
        }],
    }];

    template.lists = vec![ListInstance {
        title: "Projects".into(),
        description: "Project tracking".into(),
        document_template: String::new(),
        on_quick_launch: true,
        template_type: 100,
        url: "Lists/Projects".into(),
        enable_versioning: true,
        minor_version_limit: 0,
        max_version_limit: 10,
        remove_existing_content_types: false,
        template_feature_id: Uuid::from_u128(0x00BFEA71_DE22_43B2_A848_C05709900100),
        content_types_enabled: true,
        hidden: false,
        remove_existing_views: true,
        content_type_bindings: vec![ContentTypeBinding {
            content_type_id: "0x0101009D1CB255DA76424F860D91F20E6C4118".into(),
            default: true,
        }],
        views: vec![View::new(
            r#"<View DisplayName="All Projects" DefaultView="TRUE"><ViewFields><FieldRef Name="Title" /></ViewFields><RowLimit>30</RowLimit></View>"#,
        )],
        fields: vec![Field::new(
            r#"<Field Type="Number" Name="Budget" DisplayName="Budget" ID="{B01B3DBC-4630-4ED1-B5BA-321BC7841E3D}" />"#,
        )],
        field_refs: vec![FieldRef::new(project_field)],
        data_rows: vec![
            DataRow::new([("Title", "Apollo"), ("Budget", "1000")]),
            DataRow::new([("Title", "Gemini & Co"), ("Budget", "")]),
        ],
    }];

    template.features = Features {
        site_features: vec![Feature {
            id: Uuid::from_u128(0xB50E3104_6812_424F_A011_CC90E6327318),
            deactivate: false,
        }],
        web_features: vec![Feature {
            id: Uuid::from_u128(0x87294C72_F260_42F3_A41B_981A2FFCE37A),
            deactivate: true,
        }],
    };
    template.custom_actions = CustomActions {
        site_custom_actions: vec![CustomAction {
            name: "jQuery".into(),
            location: "ScriptLink".into(),
            title: "jQuery".into(),
            sequence: 100,
            rights: 0,
            enabled: true,
            script_src: "~site/SiteAssets/jquery.js".into(),
            ..CustomAction::default()
        }],
        web_custom_actions: vec![CustomAction {
            name: "Help".into(),
            description: "Opens the help page".into(),
            group: "SiteActions".into(),
            location: "Microsoft.SharePoint.StandardMenu".into(),
            title: "Help".into(),
            sequence: 1000,
            rights: 0x0000_0000_0000_0001,
            url: "~site/Help.aspx".into(),
            enabled: true,
            image_url: "~site/help.png".into(),
            ..CustomAction::default()
        }],
    };

    template.files = vec![File {
        src: "Pages/Dashboard.aspx".into(),
        folder: "SitePages".into(),
        overwrite: true,
        web_parts: vec![WebPart {
            title: "Announcements".into(),
            position: WebPartPosition::Zone {
                zone: "Main".into(),
                order: 2,
            },
            contents: r#"<webParts><webPart xmlns="http://schemas.microsoft.com/WebPart/v3" /></webParts>"#
                .into(),
        }],
    }];
    template.pages = vec![Page {
        url: "SitePages/Home.aspx".into(),
        overwrite: false,
        layout: WikiPageLayout::TwoColumnsHeader,
        web_parts: vec![WebPart {
            title: "Welcome".into(),
            position: WebPartPosition::Cell { row: 1, column: 2 },
            contents: "<webParts />".into(),
        }],
    }];

    let mut root = Term::new(Uuid::from_u128(0x100), "Engineering");
    root.owner = Some("i:0#.f|membership|admin@contoso.com".into());
    root.is_available_for_tagging = Some(true);
    root.custom_sort_order = 1;
    root.labels = vec![TermLabel {
        language: 1033,
        value: "Engineering".into(),
        is_default_for_language: Some(true),
    }];
    root.properties.insert("CostCenter".into(), "4711".into());
    let mut child = Term::new(Uuid::from_u128(0x101), "Platform");
    child.is_available_for_tagging = Some(false);
    child.labels = vec![TermLabel {
        language: 1033,
        value: "Platform".into(),
        is_default_for_language: Some(false),
    }];
    child
        .local_properties
        .insert("Navigation".into(), "true".into());
    root.terms.push(child);
    template.term_groups = vec![TermGroup {
        id: Uuid::from_u128(0x10),
        name: "Contoso".into(),
        description: "Corporate taxonomy".into(),
        term_sets: vec![TermSet {
            id: Uuid::from_u128(0x11),
            name: "Departments".into(),
            description: String::new(),
            language: Some(1033),
            terms: vec![root],
        }],
    }];

    template.composed_look = Some(ComposedLook {
        name: "Contoso".into(),
        color_file: "~sitecollection/_catalogs/theme/15/contoso.spcolor".into(),
        font_file: String::new(),
        background_file: "~sitecollection/SiteAssets/bg.jpg".into(),
        master_page: "~sitecollection/_catalogs/masterpage/seattle.master".into(),
        site_logo: String::new(),
        alternate_css: String::new(),
        version: 2,
    });
    template.providers = vec![Provider {
        type_name: BRANDING_HANDLER.into(),
        assembly: BRANDING_ASSEMBLY.into(),
        configuration: Some(r#"<Branding xmlns="urn:contoso:branding"><Color>Blue</Color></Branding>"#.into()),
        enabled: true,
    }];
    template
}
