use brigo_api::{
    adapters::MemoryAdapter,
    config::Config,
    web::{self, state::AppState},
};
use brigo_client::{BrigoClient, ClientConfig, ClientError, HttpNotebookService, Session, SignedIn};
use brigo_core::domain::{AuthUser, MaterialInput, MaterialKind, NewNotebook, NotebookUpdate};
use brigo_core::ports::{NotebookService, PortError};
use brigo_core::retry::RetryPolicy;
use brigo_core::store::{LoadState, NotebookStore};
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// Starts the API on a random local port, backed by memory.
async fn spawn_api() -> String {
    let memory = Arc::new(MemoryAdapter::new());
    let state = Arc::new(AppState {
        notebooks: memory.clone(),
        accounts: memory,
        config: Arc::new(Config::from_lookup(|_| None).unwrap()),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, web::router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(api_url: &str) -> BrigoClient {
    let mut config = ClientConfig::new(api_url).unwrap();
    config.load_retry = RetryPolicy::immediate(3);
    BrigoClient::new(&config).unwrap()
}

#[tokio::test]
async fn signed_out_client_never_calls_the_api() {
    let client = client_for(&spawn_api().await);

    client.store().load_notebooks(None).await.unwrap();
    assert!(client.store().notebooks().is_empty());
    assert_eq!(client.store().load_state(), LoadState::Idle);

    let created = client
        .store()
        .create_notebook(NewNotebook {
            title: "Nope".into(),
        })
        .await
        .unwrap();
    assert_eq!(created, None);

    assert!(matches!(
        client
            .attach_material("n1", MaterialInput::text("x"))
            .await,
        Err(ClientError::NotSignedIn)
    ));
}

#[tokio::test]
async fn notebook_lifecycle_through_the_api() {
    let client = client_for(&spawn_api().await);
    let user = client
        .sign_up("ada@example.com", "correct horse")
        .await
        .unwrap();
    let store = client.store();

    let notebook = store
        .create_notebook(NewNotebook {
            title: "Biology".into(),
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(store.notebooks().len(), 1);

    // Optimistic copy first, stored copy after the next load.
    let stored = client
        .attach_material(&notebook.id, MaterialInput::text("Mitochondria"))
        .await
        .unwrap();
    let local = store.notebook(&notebook.id).unwrap().materials;
    assert_eq!(local.len(), 1);
    assert!(local[0].id.starts_with("material-"));

    store.load_notebooks(None).await.unwrap();
    assert_eq!(store.synced_user_id(), Some(user.id.clone()));
    assert!(store.synced_at().is_some());
    let loaded = store.notebook(&notebook.id).unwrap();
    assert_eq!(loaded.materials, vec![stored]);

    store
        .update_notebook(
            &notebook.id,
            NotebookUpdate {
                title: Some("Cell biology".into()),
                progress: Some(40.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(store.notebook(&notebook.id).unwrap().title, "Cell biology");

    store.load_notebooks(None).await.unwrap();
    let reloaded = store.notebook(&notebook.id).unwrap();
    assert_eq!(reloaded.title, "Cell biology");
    assert_eq!(reloaded.progress, 40.0);
    assert_eq!(reloaded.materials.len(), 1);

    store.delete_notebook(&notebook.id).await.unwrap();
    assert!(store.notebooks().is_empty());
    store.load_notebooks(None).await.unwrap();
    assert!(store.notebooks().is_empty());
}

#[tokio::test]
async fn remote_failures_leave_local_state_alone() {
    let client = client_for(&spawn_api().await);
    client
        .sign_up("bo@example.com", "correct horse")
        .await
        .unwrap();
    let store = client.store();
    let notebook = store
        .create_notebook(NewNotebook {
            title: "Physics".into(),
        })
        .await
        .unwrap()
        .unwrap();

    let result = store.delete_notebook("does-not-exist").await;
    assert!(matches!(result, Err(PortError::NotFound(_))));
    assert_eq!(store.notebooks().len(), 1);

    let empty_update = store
        .update_notebook(&notebook.id, NotebookUpdate::default())
        .await;
    assert!(empty_update.is_err());
    assert_eq!(store.notebook(&notebook.id), Some(notebook.clone()));

    // Materials without a payload are rejected and the optimistic copy rolled back.
    let rejected = client
        .attach_material(&notebook.id, MaterialInput::new(MaterialKind::Pdf))
        .await;
    assert!(rejected.is_err());
    assert!(store.notebook(&notebook.id).unwrap().materials.is_empty());
}

#[tokio::test]
async fn sign_out_clears_the_store_and_the_session() {
    let api_url = spawn_api().await;
    let client = client_for(&api_url);
    let user = client
        .sign_up("cy@example.com", "correct horse")
        .await
        .unwrap();
    client
        .store()
        .create_notebook(NewNotebook {
            title: "Art".into(),
        })
        .await
        .unwrap();
    let token = client.session().current().unwrap().token;

    client.sign_out().await.unwrap();

    assert!(!client.session().is_signed_in());
    assert!(client.store().notebooks().is_empty());
    assert_eq!(client.store().synced_at(), None);

    // The old token no longer works on the backend either.
    let stale = Arc::new(Session::new());
    stale.sign_in(SignedIn { user: user.clone(), token });
    let service = HttpNotebookService::new(&api_url, reqwest_client(), stale);
    assert_eq!(
        service.fetch_notebooks(&user.id).await,
        Err(PortError::Unauthorized)
    );

    // Signing back in brings the notebooks back.
    client.sign_in("cy@example.com", "correct horse").await.unwrap();
    client.store().load_notebooks(None).await.unwrap();
    assert_eq!(client.store().notebooks().len(), 1);
}

#[tokio::test]
async fn load_gives_up_after_three_attempts_when_the_api_is_down() {
    // Reserve a port, then free it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let api_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let session = Arc::new(Session::new());
    session.sign_in(SignedIn {
        user: AuthUser {
            id: "u1".into(),
            email: None,
        },
        token: "t".into(),
    });
    let service = Arc::new(HttpNotebookService::new(
        &api_url,
        reqwest_client(),
        session.clone(),
    ));
    let store = NotebookStore::new(service, session).with_retry_policy(RetryPolicy::immediate(3));

    let result = store.load_notebooks(None).await;

    assert!(matches!(result, Err(PortError::Unexpected(_))));
    assert!(store.notebooks().is_empty());
    assert_eq!(store.load_state(), LoadState::Failed);
    assert_eq!(store.synced_at(), None);
}

fn reqwest_client() -> reqwest::Client {
    reqwest::Client::new()
}
