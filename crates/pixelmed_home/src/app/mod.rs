mod bootstrap;
mod loop_runner;
mod renderer;
mod router;

pub(crate) use loop_runner::AppError;

pub(crate) fn run() -> Result<(), AppError> {
    let wiring = bootstrap::build_app()?;
    loop_runner::run_app(wiring)
}
