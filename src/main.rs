use pathbind::ui::output;

fn main() {
    if let Err(err) = pathbind::cli::run() {
        output::error(format!("{:#}", err));
        std::process::exit(1);
    }
}
