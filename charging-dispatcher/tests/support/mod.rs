use charging_dispatcher::{
    Connector, Dispatcher, DispatcherConfig, ProfileSource, ProfileTables, RpcFacade,
};
use integration_test_utils::{two_engine_tables, TENANT};
use std::sync::Arc;
use std::time::Duration;

pub(crate) fn test_config() -> DispatcherConfig {
    DispatcherConfig::default()
        .with_attempt_timeout(Duration::from_millis(500))
        .with_connect_timeout(Duration::from_millis(500))
}

#[allow(dead_code)]
pub(crate) async fn make_dispatcher(
    name: &str,
    connector: Arc<dyn Connector>,
    profiles: Arc<dyn ProfileSource>,
) -> Arc<Dispatcher> {
    Arc::new(
        Dispatcher::new(name, test_config(), connector, profiles)
            .await
            .expect("dispatcher creation should succeed"),
    )
}

#[allow(dead_code)]
pub(crate) async fn make_two_engine_facade(
    name: &str,
    connector: Arc<dyn Connector>,
    engine1: &str,
    engine2: &str,
) -> RpcFacade {
    let tables: ProfileTables =
        two_engine_tables(engine1, engine2).expect("fixture tables should build");
    let dispatcher = make_dispatcher(name, connector, Arc::new(tables)).await;
    RpcFacade::new(dispatcher, TENANT)
}
