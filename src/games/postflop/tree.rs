//! Arena game tree for one betting round.
//!
//! The tree is built breadth-first from a [`GameState`] and stops at the
//! end of the round: states that need a board card become chance nodes
//! listing their outcomes, and finished hands become terminal nodes. Nodes
//! live in one `Vec` and address each other by index; the children of a
//! node occupy a contiguous index range.
//!
//! The solver itself walks states implicitly through
//! [`GameState::after_action`]. The tree uses the same transitions, so
//! legality and information-set keys agree between the two.

use std::collections::VecDeque;
use std::fmt;
use std::ops::Range;

use super::action::PokerAction;
use super::card::{Card, NUM_CARDS};
use super::state::{GameState, Player};

/// Index of a node in a [`GameTree`].
pub type NodeId = u32;

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A player decision. `actions[i]` leads to the `i`-th child.
    Player {
        /// Player to act.
        player: Player,
        /// Legal actions in menu order.
        actions: Vec<PokerAction>,
    },
    /// A board card is due. Outcomes are uniform over the unseen deck.
    Chance {
        /// Possible cards with their probabilities.
        outcomes: Vec<(Card, f64)>,
    },
    /// The hand is over.
    Terminal,
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Parent index, `None` for the root.
    pub parent: Option<NodeId>,
    /// Action that led here from the parent.
    pub action: Option<PokerAction>,
    /// Distance from the root.
    pub depth: u16,
    /// Node payload.
    pub kind: NodeKind,
    /// State at this node.
    pub state: GameState,
    children: Range<NodeId>,
}

impl TreeNode {
    /// Check if this is a player decision.
    pub fn is_player(&self) -> bool {
        matches!(self.kind, NodeKind::Player { .. })
    }

    /// Check if this is a chance node.
    pub fn is_chance(&self) -> bool {
        matches!(self.kind, NodeKind::Chance { .. })
    }

    /// Check if this is a terminal node.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Terminal)
    }

    /// Actions available at a player node, empty elsewhere.
    pub fn actions(&self) -> &[PokerAction] {
        match &self.kind {
            NodeKind::Player { actions, .. } => actions,
            _ => &[],
        }
    }
}

/// Breadth-first arena of the betting round starting at a state.
#[derive(Debug, Clone)]
pub struct GameTree {
    nodes: Vec<TreeNode>,
}

impl GameTree {
    /// Build the tree of the betting round starting at `root`.
    pub fn build(root: &GameState) -> Self {
        let mut nodes = vec![Self::make_node(root.clone(), None, None, 0)];
        let mut queue = VecDeque::from([0 as NodeId]);

        while let Some(id) = queue.pop_front() {
            let (state, depth, actions) = {
                let node = &nodes[id as usize];
                (node.state.clone(), node.depth, node.actions().to_vec())
            };
            let first = nodes.len() as NodeId;
            for action in actions {
                let child = Self::make_node(state.after_action(action), Some(id), Some(action), depth + 1);
                if child.is_player() {
                    queue.push_back(nodes.len() as NodeId);
                }
                nodes.push(child);
            }
            nodes[id as usize].children = first..nodes.len() as NodeId;
        }

        Self { nodes }
    }

    fn make_node(state: GameState, parent: Option<NodeId>, action: Option<PokerAction>, depth: u16) -> TreeNode {
        let kind = if state.needs_board_card() {
            let dead = state.board().mask();
            let unseen: Vec<Card> = Card::all().filter(|c| dead & c.mask() == 0).collect();
            debug_assert_eq!(unseen.len(), NUM_CARDS as usize - state.board().len());
            let p = 1.0 / unseen.len().max(1) as f64;
            NodeKind::Chance {
                outcomes: unseen.into_iter().map(|c| (c, p)).collect(),
            }
        } else if let Some(player) = state.current_player() {
            NodeKind::Player {
                player,
                actions: state.available_actions(),
            }
        } else {
            NodeKind::Terminal
        };
        TreeNode {
            parent,
            action,
            depth,
            kind,
            state,
            children: 0..0,
        }
    }

    /// Root index.
    pub fn root(&self) -> NodeId {
        0
    }

    /// Node by index.
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id as usize)
    }

    /// Children of a node, in action order.
    pub fn children(&self, id: NodeId) -> Range<NodeId> {
        self.node(id).map_or(0..0, |n| n.children.clone())
    }

    /// Child reached by `action`, if it is legal at `id`.
    pub fn child(&self, id: NodeId, action: &PokerAction) -> Option<NodeId> {
        let node = self.node(id)?;
        let pos = node.actions().iter().position(|a| a == action)?;
        Some(node.children.start + pos as NodeId)
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena has no nodes. A built tree always has its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of decision nodes.
    pub fn num_player_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_player()).count()
    }

    /// Number of chance nodes.
    pub fn num_chance_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_chance()).count()
    }

    /// Number of terminal nodes.
    pub fn num_terminal_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_terminal()).count()
    }

    /// Deepest node distance from the root.
    pub fn depth(&self) -> u16 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Iterate over all nodes in breadth-first order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as NodeId, n))
    }
}

impl fmt::Display for GameTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes ({} decision, {} chance, {} terminal), depth {}",
            self.len(),
            self.num_player_nodes(),
            self.num_chance_nodes(),
            self.num_terminal_nodes(),
            self.depth()
        )
    }
}
