fn main() {
    if let Err(err) = po_prices::run() {
        eprintln!("error: {err:#}");
        if let Some(hint) = po_prices::error_hint(&err) {
            eprintln!("hint: {hint}");
        }
        std::process::exit(1);
    }
}
