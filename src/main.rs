fn main() {
    wildslot::app::cli::run();
}
