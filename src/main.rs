fn main() {
    if let Err(err) = skill_tree_layout::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
