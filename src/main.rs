use gcp_filter::cli;

fn main() {
    cli::run();
}
