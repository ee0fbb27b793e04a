//! Prints the slash-command catalog as JSON, ready to upload to the
//! platform's command registration endpoint.

fn main() {
    let catalog = grant_core::schema::catalog();
    let json = serde_json::to_string_pretty(catalog).expect("Failed to serialize command catalog");
    println!("{}", json);
}
