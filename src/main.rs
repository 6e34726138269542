use loadphase::error::AppResult;

fn main() -> AppResult<()> {
    loadphase::entry::run()
}
