fn main() {
    ebbtide::uci::run();
}
