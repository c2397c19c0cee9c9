fn main() -> anyhow::Result<()> {
    dentoscan_lib::run()
}
