use chimap::chimap_ui::ChimapApp;

fn main() -> eframe::Result {
  // init logger.
  env_logger::init();

  // start tokio on another thread for the summary fetch tasks.
  let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
  let _enter = rt.enter();
  std::thread::spawn(move || {
    rt.block_on(async {
      loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(3600)).await;
      }
    });
  });

  let options = eframe::NativeOptions {
    ..Default::default()
  };
  eframe::run_native(
    "chimap",
    options,
    Box::new(|cc| Ok(Box::new(ChimapApp::new(cc.egui_ctx.clone())))),
  )
  .inspect_err(|e| log::error!("failed to start the map window: {e}"))
}
