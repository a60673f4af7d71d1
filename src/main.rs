fn main() {
    eclipse_parry::game::run();
}
