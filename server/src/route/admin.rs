use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::response::CircuitPresenter;
use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use kernel::KernelError;

pub trait AdminRouter {
    fn route_admin(self) -> Self;
}

impl AdminRouter for Router<AppModule> {
    fn route_admin(self) -> Self {
        self.route(
            "/admin/circuit-breaker",
            get(|State(module): State<AppModule>| async move {
                Controller::new((), CircuitPresenter)
                    .bypass(|| async move {
                        let breaker = module.stock().breaker();
                        Ok::<_, error_stack::Report<KernelError>>((
                            breaker.name().to_string(),
                            breaker.snapshot(),
                        ))
                    })
                    .await
                    .map_err(ErrorStatus::from)
            }),
        )
        .route(
            "/admin/circuit-breaker/reset",
            post(|State(module): State<AppModule>| async move {
                Controller::new((), CircuitPresenter)
                    .bypass(|| async move {
                        module.stock().breaker().reset();
                        tracing::info!("stock circuit breaker reset");
                        Ok::<_, error_stack::Report<KernelError>>(())
                    })
                    .await
                    .map_err(ErrorStatus::from)
            }),
        )
    }
}
