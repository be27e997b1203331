//! Trello backend: cards in a "to-do" list, completed cards moved to a "done" list.

use chrono::NaiveDate;
use serde::Deserialize;

use super::http::{agent, read_json, request_error};
use super::{due_timestamp, TaskProvider};
use crate::config::{TrelloConfig, TrelloCredentials};
use crate::error::Result;
use crate::state::TaskList;

const DEFAULT_BASE_URL: &str = "https://api.trello.com";

#[derive(Debug, Deserialize)]
struct Card {
    id: String,
    name: String,
}

/// A list on a Trello board, as printed by `pandoro lists <board>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoardList {
    pub id: String,
    pub name: String,
}

struct Client {
    credentials: TrelloCredentials,
    base_url: String,
    agent: ureq::Agent,
}

impl Client {
    fn new(credentials: TrelloCredentials, base_url: &str) -> Self {
        Self {
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: agent(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/1/{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> ureq::Request {
        self.authed(self.agent.get(&self.url(path)))
    }

    fn authed(&self, request: ureq::Request) -> ureq::Request {
        request
            .query("key", &self.credentials.key)
            .query("token", &self.credentials.token)
    }
}

pub struct Trello {
    client: Client,
    todo_list: String,
    done_list: String,
}

impl Trello {
    pub fn new(config: TrelloConfig) -> Self {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(config: TrelloConfig, base_url: &str) -> Self {
        Self {
            client: Client::new(config.credentials, base_url),
            todo_list: config.todo_list,
            done_list: config.done_list,
        }
    }
}

/// Board browsing, used to look up the list ids the config file needs.
pub struct TrelloBoards {
    client: Client,
}

impl TrelloBoards {
    pub fn new(credentials: TrelloCredentials) -> Self {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(credentials: TrelloCredentials, base_url: &str) -> Self {
        Self {
            client: Client::new(credentials, base_url),
        }
    }

    pub fn board_lists(&self, board_id: &str) -> Result<Vec<BoardList>> {
        let context = "fetch board lists";
        let response = self
            .client
            .get(&format!("boards/{}/lists", board_id))
            .call()
            .map_err(|e| request_error(context, e))?;
        read_json(context, response)
    }
}

fn cards_to_tasks(cards: Vec<Card>) -> TaskList {
    cards.into_iter().map(|c| (c.id, c.name)).collect()
}

fn create_form<'a>(
    title: &'a str,
    todo_list: &'a str,
    due: Option<&'a str>,
) -> Vec<(&'a str, &'a str)> {
    let mut form = vec![("name", title), ("pos", "top"), ("idList", todo_list)];
    if let Some(due) = due {
        form.push(("due", due));
    }
    form
}

impl TaskProvider for Trello {
    fn name(&self) -> &'static str {
        "trello"
    }

    fn fetch_tasks(&self) -> Result<TaskList> {
        let context = "fetch cards";
        let response = self
            .client
            .get(&format!("lists/{}/cards", self.todo_list))
            .call()
            .map_err(|e| request_error(context, e))?;
        let cards: Vec<Card> = read_json(context, response)?;
        Ok(cards_to_tasks(cards))
    }

    fn create_task(&self, title: &str, due: Option<NaiveDate>) -> Result<()> {
        let due = due.map(due_timestamp);
        let form = create_form(title, &self.todo_list, due.as_deref());
        let client = &self.client;
        client
            .authed(client.agent.post(&client.url("cards")))
            .send_form(&form)
            .map_err(|e| request_error("create card", e))?;
        Ok(())
    }

    fn complete_task(&self, task_id: &str) -> Result<()> {
        let client = &self.client;
        client
            .authed(client.agent.put(&client.url(&format!("cards/{}", task_id))))
            .send_form(&[("idList", self.done_list.as_str()), ("pos", "top")])
            .map_err(|e| request_error("move card to done list", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    fn credentials() -> TrelloCredentials {
        TrelloCredentials {
            key: "k".into(),
            token: "t".into(),
        }
    }

    fn config() -> TrelloConfig {
        TrelloConfig {
            credentials: credentials(),
            todo_list: "todo".into(),
            done_list: "done".into(),
        }
    }

    #[test]
    fn test_cards_keep_list_order() {
        let cards: Vec<Card> = parse_json(
            "fetch cards",
            r#"[{"id":"c2","name":"Second","pos":2,"closed":false},{"id":"c1","name":"First","pos":1}]"#,
        )
        .unwrap();

        let tasks = cards_to_tasks(cards);
        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);
        assert_eq!(tasks.title("c1"), Some("First"));
    }

    #[test]
    fn test_create_form_without_due() {
        assert_eq!(
            create_form("Write spec", "todo", None),
            vec![("name", "Write spec"), ("pos", "top"), ("idList", "todo")]
        );
    }

    #[test]
    fn test_create_form_with_due() {
        let form = create_form("Pay rent", "todo", Some("2024-03-01T00:00:00.000Z"));
        assert_eq!(form.last(), Some(&("due", "2024-03-01T00:00:00.000Z")));
    }

    #[test]
    fn test_urls() {
        let trello = Trello::with_base_url(config(), "http://localhost:9999/");
        assert_eq!(
            trello.client.url("lists/todo/cards"),
            "http://localhost:9999/1/lists/todo/cards"
        );
        assert_eq!(
            Trello::new(config()).client.url("cards"),
            "https://api.trello.com/1/cards"
        );
        assert_eq!(
            TrelloBoards::new(credentials()).client.url("boards/b/lists"),
            "https://api.trello.com/1/boards/b/lists"
        );
    }

    #[test]
    fn test_board_lists_parse() {
        let lists: Vec<BoardList> = parse_json(
            "fetch board lists",
            r#"[{"id":"l1","name":"To do","closed":false},{"id":"l2","name":"Done"}]"#,
        )
        .unwrap();
        assert_eq!(
            lists[1],
            BoardList {
                id: "l2".into(),
                name: "Done".into()
            }
        );
    }
}
