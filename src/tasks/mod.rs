pub mod charger_task;
