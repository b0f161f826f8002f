use pnp::formatter::taxonomy;
use pnp::model::{Term, TermLabel};
use uuid::Uuid;

fn term(id: u128, name: &str) -> Term {
    let mut term = Term::new(Uuid::from_u128(id), name);
    term.labels.push(TermLabel {
        language: 1033,
        value: name.into(),
        is_default_for_language: Some(true),
    });
    term
}

fn print(terms: &[Term], depth: usize) {
    for term in terms {
        println!("{:indent$}{} ({})", "", term.name, term.id, indent = depth * 2);
        print(&term.terms, depth + 1);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut engineering = term(1, "Engineering");
    let mut platform = term(2, "Platform");
    platform.terms.push(term(3, "Storage"));
    platform.terms.push(term(4, "Networking"));
    engineering.terms.push(platform);
    engineering.terms.push(term(5, "Mobile"));

    let wire = taxonomy::to_wire(std::slice::from_ref(&engineering));
    let back = taxonomy::from_wire(&wire)?;
    print(&back, 0);
    println!("terms: {}", back[0].subtree_len());
    if let Some(storage) = back[0].find(Uuid::from_u128(3)) {
        println!("found {} with {} label(s)", storage.name, storage.labels.len());
    }
    Ok(())
}
