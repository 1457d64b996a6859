use std::fmt::Write;

pub const HEADING: &str = "Ready to go shopping?";

pub const EXAMPLE_QUERIES: [&str; 3] = [
    "Camping gear for 2 people under $300",
    "Outfit for a summer garden wedding",
    "Tech starter pack for a home office",
];

pub fn render() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{HEADING}");
    let _ = writeln!(
        out,
        "Describe what you're looking for, and the assistant will curate a list of products for you."
    );
    for example in EXAMPLE_QUERIES {
        let _ = writeln!(out, "  \"{example}\"");
    }
    out
}
