//! Production scheduling presentation layer

pub mod jobs;
pub mod machines;
pub mod models;
pub mod orders;

use std::sync::Arc;

use crate::application::production::{
    CreateProductionJobUseCase, CreateProductionOrderUseCase, DeleteProductionJobUseCase,
    DeleteProductionOrderUseCase, GetMachineStatisticsUseCase, GetMachineUseCase,
    GetOrderStatisticsUseCase, GetProductionOrderUseCase, ListMachinesUseCase,
    ListOrderJobsUseCase, ListProductionOrdersUseCase, ReorderProductionJobsUseCase,
    UpdateMachineStatusUseCase, UpdateProductionJobUseCase, UpdateProductionOrderUseCase,
};

/// State for production order, machine and job endpoints
#[derive(Clone)]
pub struct ProductionAppState {
    pub list_orders_use_case: Arc<ListProductionOrdersUseCase>,
    pub get_order_use_case: Arc<GetProductionOrderUseCase>,
    pub create_order_use_case: Arc<CreateProductionOrderUseCase>,
    pub update_order_use_case: Arc<UpdateProductionOrderUseCase>,
    pub delete_order_use_case: Arc<DeleteProductionOrderUseCase>,
    pub order_statistics_use_case: Arc<GetOrderStatisticsUseCase>,
    pub list_machines_use_case: Arc<ListMachinesUseCase>,
    pub get_machine_use_case: Arc<GetMachineUseCase>,
    pub update_machine_status_use_case: Arc<UpdateMachineStatusUseCase>,
    pub machine_statistics_use_case: Arc<GetMachineStatisticsUseCase>,
    pub list_jobs_use_case: Arc<ListOrderJobsUseCase>,
    pub create_job_use_case: Arc<CreateProductionJobUseCase>,
    pub update_job_use_case: Arc<UpdateProductionJobUseCase>,
    pub delete_job_use_case: Arc<DeleteProductionJobUseCase>,
    pub reorder_jobs_use_case: Arc<ReorderProductionJobsUseCase>,
}
