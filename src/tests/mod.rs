mod monitor_control_tests;
mod settings_watcher_tests;
