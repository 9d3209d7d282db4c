use flowcap_core_types::{
    parse_timestamp_ms, ActionApiTimeline, ApiRequestRecord, CorrelatedAction, TriggeredApi,
    UserAction,
};

/// Maximum delay between an action and a request for them to correlate.
pub const DEFAULT_WINDOW_MS: u64 = 2000;

/// Correlate user actions with the API requests they triggered.
///
/// Greedy single pass: actions in timestamp order claim, in timestamp order,
/// every still-unclaimed request whose delay after the action falls inside
/// `window_ms`. A claimed request is gone for all later actions; earlier
/// actions have first claim on earlier requests. Requests never claimed end
/// up in `uncorrelated_apis`. Pure: identical input yields identical output.
pub fn correlate(
    actions: &[UserAction],
    api_requests: &[ApiRequestRecord],
    window_ms: u64,
) -> ActionApiTimeline {
    // Actions without a parseable timestamp are excluded silently.
    let mut timed_actions: Vec<(i64, &UserAction)> = actions
        .iter()
        .filter_map(|action| parse_timestamp_ms(&action.timestamp).map(|ms| (ms, action)))
        .collect();
    timed_actions.sort_by_key(|(ms, _)| *ms);

    // Requests keep their place in the partition even when their timestamp
    // is unparseable; they sort last and can never be claimed.
    let mut timed_requests: Vec<(Option<i64>, &ApiRequestRecord)> = api_requests
        .iter()
        .map(|request| (parse_timestamp_ms(&request.timestamp), request))
        .collect();
    timed_requests.sort_by_key(|(ms, _)| ms.unwrap_or(i64::MAX));

    let mut claimed = vec![false; timed_requests.len()];
    let mut correlated_actions = Vec::with_capacity(timed_actions.len());

    for (position, (action_ms, action)) in timed_actions.iter().enumerate() {
        let mut triggered_apis = Vec::new();

        for (idx, (request_ms, request)) in timed_requests.iter().enumerate() {
            if claimed[idx] {
                continue;
            }
            let Some(request_ms) = request_ms else {
                continue;
            };
            let delay = request_ms - action_ms;
            if delay < 0 || delay as u64 > window_ms {
                continue;
            }
            claimed[idx] = true;
            triggered_apis.push(TriggeredApi {
                method: request.method.clone(),
                url: request.url.clone(),
                path: request.path.clone(),
                status: request.status,
                delay_ms: delay as u64,
                response_content_type: request.response_content_type.clone(),
            });
        }

        correlated_actions.push(CorrelatedAction {
            index: position + 1,
            action: (*action).clone(),
            triggered_apis,
        });
    }

    let uncorrelated_apis = timed_requests
        .iter()
        .enumerate()
        .filter(|(idx, _)| !claimed[*idx])
        .map(|(_, (_, request))| (*request).clone())
        .collect();

    ActionApiTimeline {
        correlated_actions,
        uncorrelated_apis,
    }
}
