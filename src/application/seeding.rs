//! Startup data seeding
//!
//! Fills empty scheduling tables with the tire plant demo data, or with the
//! machines, orders and jobs given in `[seed]` configuration.

use chrono::{DateTime, Duration, Utc};
use std::str::FromStr;
use std::sync::Arc;

use crate::application::errors::ApplicationError;
use crate::application::production::SYSTEM_USER;
use crate::config::{JobSeed, MachineSeed, OrderSeed, SeedConfig};
use crate::domain::production::{
    entities::{NewMachine, NewProductionJob, NewProductionOrder},
    errors::ProductionError,
    repositories::{IMachineRepository, IProductionJobRepository, IProductionOrderRepository},
    value_objects::{JobStatus, MachineStatus, OrderNumber, OrderStatus, Priority},
};

/// Rows written by one seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub machines: usize,
    pub orders: usize,
    pub jobs: usize,
}

pub struct DatabaseSeeder {
    machine_repository: Arc<dyn IMachineRepository>,
    order_repository: Arc<dyn IProductionOrderRepository>,
    job_repository: Arc<dyn IProductionJobRepository>,
    config: SeedConfig,
}

impl DatabaseSeeder {
    pub fn new(
        machine_repository: Arc<dyn IMachineRepository>,
        order_repository: Arc<dyn IProductionOrderRepository>,
        job_repository: Arc<dyn IProductionJobRepository>,
        config: SeedConfig,
    ) -> Self {
        Self {
            machine_repository,
            order_repository,
            job_repository,
            config,
        }
    }

    /// Seed every empty table. Does nothing when seeding is disabled.
    pub async fn seed(&self) -> Result<SeedReport, ApplicationError> {
        if !self.config.enabled {
            tracing::info!("Database seeding disabled");
            return Ok(SeedReport::default());
        }

        tracing::info!("Starting database seeding process");
        if self.config.enable_cleanup {
            self.cleanup().await?;
        }

        let now = Utc::now();
        let report = SeedReport {
            machines: self.seed_machines(now).await?,
            orders: self.seed_orders(now).await?,
            jobs: if self.config.seed_relationships {
                self.seed_jobs(now).await?
            } else {
                0
            },
        };

        tracing::info!(
            machines = report.machines,
            orders = report.orders,
            jobs = report.jobs,
            "Database seeding completed successfully"
        );
        Ok(report)
    }

    async fn cleanup(&self) -> Result<(), ProductionError> {
        tracing::warn!("Clearing scheduling tables before seeding");
        self.job_repository.clear().await?;
        self.order_repository.clear().await?;
        self.machine_repository.clear().await
    }

    async fn seed_machines(&self, now: DateTime<Utc>) -> Result<usize, ApplicationError> {
        if self.machine_repository.count().await? > 0 {
            tracing::info!("Machines already exist in database, skipping seeding");
            return Ok(0);
        }

        let seeds = if self.config.machines.is_empty() {
            default_machines()
        } else {
            self.config.machines.clone()
        };

        tracing::info!(count = seeds.len(), "Seeding machines");
        for seed in &seeds {
            let machine = machine_from_seed(seed, now)?;
            machine.validate().map_err(ProductionError::validation)?;
            self.machine_repository.create(&machine).await?;
        }
        Ok(seeds.len())
    }

    async fn seed_orders(&self, now: DateTime<Utc>) -> Result<usize, ApplicationError> {
        if self.order_repository.count_all().await? > 0 {
            tracing::info!("Production orders already exist in database, skipping seeding");
            return Ok(0);
        }

        let seeds = if self.config.orders.is_empty() {
            default_orders()
        } else {
            self.config.orders.clone()
        };

        tracing::info!(count = seeds.len(), "Seeding production orders");
        for seed in &seeds {
            let order = order_from_seed(seed, now)?;
            order.validate().map_err(ProductionError::validation)?;
            self.order_repository.create(&order).await?;
        }
        Ok(seeds.len())
    }

    async fn seed_jobs(&self, now: DateTime<Utc>) -> Result<usize, ApplicationError> {
        if self.config.jobs.is_empty() {
            return Ok(0);
        }
        if self.job_repository.count().await? > 0 {
            tracing::info!("Production jobs already exist in database, skipping seeding");
            return Ok(0);
        }

        let mut seeded = 0;
        for seed in &self.config.jobs {
            let order = match OrderNumber::new(seed.order_number.clone()) {
                Ok(number) => self.order_repository.find_by_order_number(&number).await?,
                Err(_) => None,
            };
            let Some(order) = order else {
                tracing::warn!(
                    job = %seed.job_name,
                    order_number = %seed.order_number,
                    "Skipping seeded job: order not found"
                );
                continue;
            };

            let machine = self
                .machine_repository
                .find_by_name(&seed.machine_name)
                .await?
                .filter(|m| m.is_available());
            let Some(machine) = machine else {
                tracing::warn!(
                    job = %seed.job_name,
                    machine = %seed.machine_name,
                    "Skipping seeded job: machine not found"
                );
                continue;
            };

            let job = job_from_seed(seed, order.id, machine.id, now)?;
            job.validate().map_err(ProductionError::validation)?;
            self.job_repository.create(&job).await?;
            seeded += 1;
        }
        Ok(seeded)
    }
}

fn parse_seed_value<T>(field: &str, value: &str) -> Result<T, ApplicationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| ApplicationError::Configuration {
            message: format!("seed {}: {}", field, e),
        })
}

fn machine_from_seed(seed: &MachineSeed, now: DateTime<Utc>) -> Result<NewMachine, ApplicationError> {
    Ok(NewMachine {
        name: seed.name.clone(),
        machine_type: seed.machine_type.clone(),
        status: parse_seed_value::<MachineStatus>("machine status", &seed.status)?,
        utilization: seed.utilization,
        last_maintenance: Some(now - Duration::days(seed.last_maintenance_days_ago)),
        next_maintenance: Some(now + Duration::days(seed.next_maintenance_days_ahead)),
        notes: seed.notes.clone(),
        is_active: seed.is_active,
    })
}

fn order_from_seed(
    seed: &OrderSeed,
    now: DateTime<Utc>,
) -> Result<NewProductionOrder, ApplicationError> {
    let order_number =
        OrderNumber::new(seed.order_number.clone()).map_err(|e| ApplicationError::Configuration {
            message: format!("seed order number: {}", e),
        })?;

    Ok(NewProductionOrder {
        order_number,
        customer_name: seed.customer_name.clone(),
        product_name: seed.product_name.clone(),
        quantity: seed.quantity,
        due_date: now + Duration::days(seed.due_date_days_ahead),
        priority: parse_seed_value::<Priority>("priority", &seed.priority)?,
        status: parse_seed_value::<OrderStatus>("order status", &seed.status)?,
        estimated_hours: seed.estimated_hours,
        notes: seed.notes.clone(),
        created_date: now,
        created_by: seed.created_by.clone(),
    })
}

fn job_from_seed(
    seed: &JobSeed,
    order_id: i32,
    machine_id: i32,
    now: DateTime<Utc>,
) -> Result<NewProductionJob, ApplicationError> {
    let start = now + Duration::days(seed.scheduled_start_days_ahead);
    let end = start + Duration::minutes((seed.duration * 60.0).round() as i64);

    Ok(NewProductionJob {
        production_order_id: order_id,
        job_name: seed.job_name.clone(),
        machine_id,
        duration: seed.duration,
        status: parse_seed_value::<JobStatus>("job status", &seed.status)?,
        scheduled_start_time: Some(start),
        scheduled_end_time: Some(end),
        operator: seed.operator.clone(),
        notes: seed.notes.clone(),
        sort_order: seed.sort_order,
    })
}

fn machine_seed(name: &str, machine_type: &str, ago: i64, ahead: i64, notes: &str) -> MachineSeed {
    MachineSeed {
        name: name.to_string(),
        machine_type: machine_type.to_string(),
        last_maintenance_days_ago: ago,
        next_maintenance_days_ahead: ahead,
        notes: Some(notes.to_string()),
        ..MachineSeed::default()
    }
}

/// The tire plant floor seeded when no machines are configured
pub fn default_machines() -> Vec<MachineSeed> {
    vec![
        machine_seed(
            "Tire Molding Press 1",
            "Molding Press",
            30,
            30,
            "Primary tire molding press for passenger car tires",
        ),
        machine_seed(
            "Tire Molding Press 2",
            "Molding Press",
            25,
            35,
            "Secondary tire molding press for high-performance tires",
        ),
        machine_seed(
            "Tire Building Machine 1",
            "Building Machine",
            20,
            40,
            "Automated tire building for consistent quality",
        ),
        machine_seed(
            "Tread Extrusion Line 1",
            "Extrusion Line",
            15,
            45,
            "High-capacity tread extrusion for various tire sizes",
        ),
        machine_seed(
            "Quality Control Station",
            "QC Station",
            10,
            50,
            "Final quality inspection and testing station",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn order_seed(
    order_number: &str,
    customer: &str,
    product: &str,
    quantity: i32,
    priority: Priority,
    hours: f64,
    due_in_days: i64,
    notes: &str,
) -> OrderSeed {
    OrderSeed {
        order_number: order_number.to_string(),
        customer_name: customer.to_string(),
        product_name: product.to_string(),
        quantity,
        priority: priority.as_str().to_string(),
        estimated_hours: hours,
        status: OrderStatus::Pending.as_str().to_string(),
        due_date_days_ahead: due_in_days,
        notes: Some(notes.to_string()),
        created_by: Some(SYSTEM_USER.to_string()),
    }
}

/// Sample orders seeded when no orders are configured
pub fn default_orders() -> Vec<OrderSeed> {
    vec![
        order_seed(
            "PO-2025-001",
            "AutoCorp Manufacturing",
            "Premium All-Season Tire 205/55R16",
            1000,
            Priority::High,
            48.50,
            7,
            "High-priority order for major automotive manufacturer",
        ),
        order_seed(
            "PO-2025-002",
            "WinterTech Industries",
            "Performance Winter Tire 225/45R17",
            750,
            Priority::Medium,
            36.25,
            14,
            "Winter tire production for seasonal demand",
        ),
        order_seed(
            "PO-2025-003",
            "TruckFleet Solutions",
            "Commercial Truck Tire 275/70R22.5",
            500,
            Priority::Low,
            72.00,
            21,
            "Heavy-duty commercial tire production",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::InMemoryScheduleStore;

    fn seeder(store: &InMemoryScheduleStore, config: SeedConfig) -> DatabaseSeeder {
        DatabaseSeeder::new(
            Arc::new(store.machines()),
            Arc::new(store.orders()),
            Arc::new(store.jobs()),
            config,
        )
    }

    #[tokio::test]
    async fn test_default_data_is_seeded_once() {
        let store = InMemoryScheduleStore::new();
        let first = seeder(&store, SeedConfig::default()).seed().await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                machines: 5,
                orders: 3,
                jobs: 0
            }
        );

        let second = seeder(&store, SeedConfig::default()).seed().await.unwrap();
        assert_eq!(second, SeedReport::default());

        let machines = store.machines().list_active().await.unwrap();
        assert!(machines.iter().all(|m| m.status == MachineStatus::Idle));
        let orders = store.orders().list().await.unwrap();
        assert!(orders.iter().any(|o| o.order_number.as_str() == "PO-2025-003"
            && o.priority == Priority::Low
            && o.estimated_hours == 72.0));
    }

    #[tokio::test]
    async fn test_jobs_resolve_by_name_and_skip_unknown() {
        let store = InMemoryScheduleStore::new();
        let config = SeedConfig {
            jobs: vec![
                JobSeed {
                    job_name: "Green tire building".to_string(),
                    order_number: "PO-2025-001".to_string(),
                    machine_name: "Tire Building Machine 1".to_string(),
                    duration: 4.0,
                    ..JobSeed::default()
                },
                JobSeed {
                    job_name: "Orphan".to_string(),
                    order_number: "PO-2025-001".to_string(),
                    machine_name: "Nonexistent Press".to_string(),
                    duration: 1.0,
                    ..JobSeed::default()
                },
            ],
            ..SeedConfig::default()
        };

        let report = seeder(&store, config).seed().await.unwrap();
        assert_eq!(report.jobs, 1);
    }

    #[tokio::test]
    async fn test_disabled_relationships_skip_jobs() {
        let store = InMemoryScheduleStore::new();
        let config = SeedConfig {
            seed_relationships: false,
            jobs: vec![JobSeed {
                job_name: "Curing".to_string(),
                order_number: "PO-2025-001".to_string(),
                machine_name: "Tire Molding Press 1".to_string(),
                duration: 2.0,
                ..JobSeed::default()
            }],
            ..SeedConfig::default()
        };
        let report = seeder(&store, config).seed().await.unwrap();
        assert_eq!(report.jobs, 0);
        assert_eq!(store.jobs().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_reseeds_configured_machines() {
        let store = InMemoryScheduleStore::new();
        seeder(&store, SeedConfig::default()).seed().await.unwrap();

        let config = SeedConfig {
            enable_cleanup: true,
            machines: vec![MachineSeed {
                name: "Bead Winder".to_string(),
                machine_type: "Winder".to_string(),
                ..MachineSeed::default()
            }],
            ..SeedConfig::default()
        };
        let report = seeder(&store, config).seed().await.unwrap();
        assert_eq!(report.machines, 1);
        assert_eq!(report.orders, 3);

        let machines = store.machines().list_active().await.unwrap();
        assert_eq!(machines.len(), 1);
        assert_eq!(machines[0].name, "Bead Winder");
    }

    #[tokio::test]
    async fn test_invalid_seed_status_is_a_configuration_error() {
        let store = InMemoryScheduleStore::new();
        let config = SeedConfig {
            machines: vec![MachineSeed {
                name: "Press".to_string(),
                machine_type: "Press".to_string(),
                status: "exploded".to_string(),
                ..MachineSeed::default()
            }],
            ..SeedConfig::default()
        };
        let err = seeder(&store, config).seed().await.unwrap_err();
        assert!(matches!(err, ApplicationError::Configuration { .. }));
    }
}
