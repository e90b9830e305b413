//! Complaint list rendering.
//!
//! `render` is pure: it maps a complaint list onto a typed tree, and the tree
//! is turned into markup by askama templates (which escape every field).

use askama::Template;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::domain::{Complaint, ComplaintStatus};

/// Which list container the current page carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// `#complaintList` on the user page.
    UserList,
    /// `#adminList` on the admin page.
    AdminTable,
}

impl Container {
    pub fn element_id(&self) -> &'static str {
        match self {
            Container::UserList => "complaintList",
            Container::AdminTable => "adminList",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub class: String,
}

impl From<&ComplaintStatus> for StatusBadge {
    fn from(status: &ComplaintStatus) -> Self {
        Self {
            label: status.as_str().to_string(),
            class: status.css_class(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserItem {
    pub id: String,
    pub title: String,
    pub status: StatusBadge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRow {
    pub id: String,
    pub title: String,
    pub name: String,
    pub category: String,
    pub status: StatusBadge,
    pub resolve_action: String,
    pub delete_action: String,
}

#[derive(Template, Debug, Clone, PartialEq, Eq)]
#[template(path = "components/complaint_list.html")]
pub struct UserListView {
    pub items: Vec<UserItem>,
}

#[derive(Template, Debug, Clone, PartialEq, Eq)]
#[template(path = "components/admin_table.html")]
pub struct AdminTableView {
    pub rows: Vec<AdminRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplaintView {
    UserList(UserListView),
    AdminTable(AdminTableView),
}

impl ComplaintView {
    pub fn container(&self) -> Container {
        match self {
            ComplaintView::UserList(_) => Container::UserList,
            ComplaintView::AdminTable(_) => Container::AdminTable,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ComplaintView::UserList(view) => view.items.len(),
            ComplaintView::AdminTable(view) => view.rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Markup that replaces the container's whole content.
    pub fn to_html(&self) -> askama::Result<String> {
        match self {
            ComplaintView::UserList(view) => view.render(),
            ComplaintView::AdminTable(view) => view.render(),
        }
    }
}

/// Action path for a complaint, with the id as a single encoded segment.
fn action_path(complaint: &Complaint, action: &str) -> String {
    let id = utf8_percent_encode(complaint.id.as_str(), NON_ALPHANUMERIC);
    format!("/complaints/{}/{}", id, action)
}

/// Build the view for `container`. Order follows the input.
pub fn render(complaints: &[Complaint], container: Container) -> ComplaintView {
    match container {
        Container::UserList => ComplaintView::UserList(UserListView {
            items: complaints
                .iter()
                .map(|c| UserItem {
                    id: c.id.to_string(),
                    title: c.title.clone(),
                    status: StatusBadge::from(&c.status),
                })
                .collect(),
        }),
        Container::AdminTable => ComplaintView::AdminTable(AdminTableView {
            rows: complaints
                .iter()
                .map(|c| AdminRow {
                    id: c.id.to_string(),
                    title: c.title.clone(),
                    name: c.name.clone(),
                    category: c.category.clone(),
                    status: StatusBadge::from(&c.status),
                    resolve_action: action_path(c, "resolve"),
                    delete_action: action_path(c, "delete"),
                })
                .collect(),
        }),
    }
}
