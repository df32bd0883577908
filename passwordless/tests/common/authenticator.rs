use std::sync::{Arc, Mutex};
use std::time::Duration;

use passwordless_client::{
    AuthorizationDelegate, AuthorizationRequest, PlatformAuthenticator, PlatformError,
    PresentationMode,
};

use super::fixtures::{test_assertion, test_attestation};

/// How the scripted authenticator answers `run`
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Script {
    /// Produce an attestation
    Attest,
    /// Produce an assertion
    Assert,
    /// Behave as if the user dismissed the prompt
    Dismiss,
    /// Report an operational failure
    Fail(String),
    /// Stay open until cancelled
    Hold,
}

#[derive(Default)]
struct Recorded {
    delegate: Option<AuthorizationDelegate>,
    requests: Vec<AuthorizationRequest>,
    presentations: Vec<PresentationMode>,
    cancels: usize,
}

/// Platform authenticator stand-in that follows a script
pub struct ScriptedAuthenticator {
    script: Mutex<Script>,
    recorded: Mutex<Recorded>,
}

#[allow(dead_code)]
impl ScriptedAuthenticator {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            recorded: Mutex::new(Recorded::default()),
        })
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn requests(&self) -> Vec<AuthorizationRequest> {
        self.recorded.lock().unwrap().requests.clone()
    }

    pub fn presentations(&self) -> Vec<PresentationMode> {
        self.recorded.lock().unwrap().presentations.clone()
    }

    pub fn cancels(&self) -> usize {
        self.recorded.lock().unwrap().cancels
    }

    /// Wait until `run` has been called `count` times
    pub async fn wait_for_runs(&self, count: usize) {
        for _ in 0..300 {
            if self.presentations().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Authenticator was not run {count} times");
    }
}

impl PlatformAuthenticator for ScriptedAuthenticator {
    fn begin(&self, request: AuthorizationRequest, delegate: AuthorizationDelegate) {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.requests.push(request);
        recorded.delegate = Some(delegate);
    }

    fn run(&self, presentation: PresentationMode) {
        let delegate = {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.presentations.push(presentation);
            recorded.delegate.clone()
        };
        let Some(delegate) = delegate else {
            return;
        };

        let script = self.script.lock().unwrap().clone();
        match script {
            Script::Attest => delegate.complete_with_attestation(test_attestation()),
            Script::Assert => delegate.complete_with_assertion(test_assertion()),
            Script::Dismiss => delegate.complete_with_error(PlatformError::Cancelled),
            Script::Fail(cause) => delegate.complete_with_error(PlatformError::Failed(cause)),
            Script::Hold => {}
        }
    }

    fn cancel(&self) {
        let delegate = {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.cancels += 1;
            recorded.delegate.clone()
        };

        // Acknowledge from another thread, the way platform callbacks arrive.
        if let Some(delegate) = delegate {
            std::thread::spawn(move || delegate.complete_with_error(PlatformError::Cancelled));
        }
    }
}
